//! # integration-tests
//!
//! Drives the real router over an in-memory SQLite store, real Argon2
//! hashing, real JWTs and a temporary media directory. Each [`TestApp`] is
//! fully isolated.

use std::sync::Arc;

use api_adapters::{AppState, HttpOptions, Ports};
use auth_adapters::{Argon2Hasher, JwtTokenService};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{json, Value};
use services::DefaultAdmin;
use storage_adapters::{DatabaseOptions, LocalMediaStorage};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "Admin";
pub const ADMIN_PASSWORD: &str = "Admin8265";
pub const RESIDENT_PASSWORD: &str = "Secret123";

/// The smallest byte string `image::guess_format` recognises as PNG.
pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

const BOUNDARY: &str = "barangaylink-test-boundary";

pub struct TestApp {
    router: Router,
    media: TempDir,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

/// One part of a `multipart/form-data` body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

impl<'a> Part<'a> {
    pub fn png(name: &'a str) -> Self {
        Part::File {
            name,
            file_name: "photo.png",
            content_type: "image/png",
            bytes: PNG,
        }
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let repos = storage_adapters::connect("sqlite::memory:", &DatabaseOptions::default())
            .await
            .expect("in-memory sqlite");
        let media = tempfile::tempdir().expect("media dir");
        let storage = LocalMediaStorage::new(media.path());
        storage.prepare().await.expect("media subdirectories");

        let ports = Ports {
            users: repos.users,
            items: repos.items,
            requests: repos.requests,
            hasher: Arc::new(Argon2Hasher::new()),
            tokens: Arc::new(JwtTokenService::new(
                &SecretString::from("integration-secret".to_string()),
                chrono::Duration::hours(1),
            )),
            media: Arc::new(storage),
        };
        let state = AppState::new(ports, ADMIN_USERNAME);
        state
            .accounts
            .ensure_default_admin(&DefaultAdmin {
                username: ADMIN_USERNAME.into(),
                full_name: "System Administrator".into(),
                email: "admin@barangaylink.com".into(),
                password: ADMIN_PASSWORD.into(),
            })
            .await
            .expect("default admin");

        let options = HttpOptions {
            media_root: media.path().to_path_buf(),
            ..HttpOptions::default()
        };
        Self {
            router: api_adapters::router(state, &options),
            media,
        }
    }

    pub fn media_root(&self) -> &std::path::Path {
        self.media.path()
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("infallible router");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("response body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(builder(Method::GET, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        let request = builder(method, uri, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn multipart(&self, method: Method, uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> TestResponse {
        let request = builder(method, uri, token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(request).await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn admin_token(&self) -> String {
        let response = self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        token_of(&response)
    }

    /// Registers `username` with both identity documents attached.
    pub async fn register_resident(&self, username: &str) -> TestResponse {
        let email = format!("{username}@example.com");
        self.multipart(
            Method::POST,
            "/api/auth/register/resident",
            None,
            &[
                Part::Text("username", username),
                Part::Text("full_name", "Juan Dela Cruz"),
                Part::Text("email", &email),
                Part::Text("password", RESIDENT_PASSWORD),
                Part::Text("contact_number", "09171234567"),
                Part::Text("barangay", "San Isidro"),
                Part::Text("municipality", "Tanay"),
                Part::Text("province", "Rizal"),
                Part::png("valid_id"),
                Part::png("selfie_with_id"),
            ],
        )
        .await
    }

    /// Registers, approves and logs in a resident. Returns `(id, token)`.
    pub async fn verified_resident(&self, username: &str, admin: &str) -> (i64, String) {
        let registered = self.register_resident(username).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);
        let id = id_of(&registered.body["user"]);

        let approved = self
            .json(
                Method::PUT,
                &format!("/api/admin/verifications/{id}/approve"),
                Some(admin),
                json!({}),
            )
            .await;
        assert_eq!(approved.status, StatusCode::OK, "{:?}", approved.body);

        let login = self.login(username, RESIDENT_PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);
        (id, token_of(&login))
    }

    /// Posts an item as `owner` and has the admin approve it.
    pub async fn available_item(&self, owner: &str, admin: &str, name: &str) -> i64 {
        let created = self
            .multipart(
                Method::POST,
                "/api/items",
                Some(owner),
                &[
                    Part::Text("type", "lending"),
                    Part::Text("name", name),
                    Part::Text("description", "Aluminium, 6 ft"),
                    Part::Text("condition", "good"),
                    Part::Text("due_date", "2025-01-01"),
                ],
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
        let id = id_of(&created.body["item"]);

        let approved = self
            .json(Method::PUT, &format!("/api/items/{id}/approve"), Some(admin), json!({}))
            .await;
        assert_eq!(approved.status, StatusCode::OK, "{:?}", approved.body);
        id
    }
}

pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("id field")
}

pub fn token_of(response: &TestResponse) -> String {
    response.body["token"].as_str().expect("token field").to_string()
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
