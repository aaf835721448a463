//! # api-adapters
//!
//! The HTTP surface of BarangayLink. Handlers translate JSON and multipart
//! bodies into service calls and map [`domains::DomainError`] back onto
//! status codes; no workflow rule lives here.

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use state::{AppState, HttpOptions, Ports};

#[cfg(feature = "web-axum")]
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

/// Builds the full application: every `/api` route, static uploads, the
/// JSON 404 fallback and the standard layers.
#[cfg(feature = "web-axum")]
pub fn router(state: AppState, options: &HttpOptions) -> Router {
    use handlers::{admin, auth, items, requests};
    use tower_http::services::ServeDir;

    let auth_routes = Router::new()
        .route("/register/resident", post(auth::register_resident))
        .route("/register/admin", post(auth::register_admin))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/verify", get(auth::verify))
        .route("/profile", get(auth::profile).put(auth::update_profile))
        .route("/profile/picture", put(auth::update_profile_picture))
        .route("/change-password", put(auth::change_password));

    let admin_routes = Router::new()
        .route("/verifications", get(admin::list_verifications))
        .route("/verifications/{id}", get(admin::verification_detail))
        .route("/verifications/{id}/approve", put(admin::approve_verification))
        .route("/verifications/{id}/reject", put(admin::reject_verification))
        .route("/users/{id}/rejections", get(admin::rejection_history))
        .route("/dashboard", get(admin::dashboard))
        .route("/users", get(admin::list_users))
        .route("/create", post(admin::create_admin))
        .route("/admins", get(admin::list_admins))
        .route("/admins/{id}", axum::routing::delete(admin::delete_admin))
        .route("/requests", get(admin::list_requests));

    let item_routes = Router::new()
        .route("/", post(items::create).get(items::list_available))
        .route("/mine", get(items::list_mine))
        .route("/pending", get(items::list_pending))
        .route("/{id}/approve", put(items::approve))
        .route("/{id}/reject", put(items::reject));

    let request_routes = Router::new()
        .route("/", post(requests::create))
        .route("/admin", get(requests::list_admin))
        .route("/my-requests", get(requests::list_mine))
        .route("/{id}", get(requests::detail))
        .route("/{id}/approve", put(requests::approve))
        .route("/{id}/deny", put(requests::deny));

    let api = Router::new()
        .route("/health", get(handlers::health))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .nest("/items", item_routes)
        .nest("/requests", request_routes);

    Router::new()
        .nest("/api", api)
        .nest_service(&options.uploads_prefix, ServeDir::new(&options.media_root))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(options.body_limit_bytes))
        .layer(middleware::cors_policy(&options.cors_origins))
        .layer(middleware::standard_middleware())
        .with_state(state)
}
