//! Maps [`DomainError`] onto HTTP status codes and the JSON error envelope
//! `{"success": false, "message": …, "fieldErrors": {…}}`.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::{DomainError, FieldErrors};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The request could not be decoded at all (bad JSON, bad path, …).
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("route not found")]
    RouteNotFound,
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    field_errors: FieldErrors,
}

impl ApiError {
    fn parts(self) -> (StatusCode, String, FieldErrors) {
        let no_fields = FieldErrors::new();
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, no_fields),
            ApiError::RouteNotFound => (StatusCode::NOT_FOUND, "Route not found".into(), no_fields),
            ApiError::Domain(err) => match err {
                DomainError::Validation { message, fields } | DomainError::Conflict { message, fields } => {
                    (StatusCode::BAD_REQUEST, message, fields)
                }
                DomainError::Unauthenticated(message) => (StatusCode::UNAUTHORIZED, message, no_fields),
                DomainError::InvalidToken => (
                    StatusCode::UNAUTHORIZED,
                    "Invalid or expired token".into(),
                    no_fields,
                ),
                DomainError::Forbidden(message) => (StatusCode::FORBIDDEN, message, no_fields),
                DomainError::VerificationRequired => (
                    StatusCode::FORBIDDEN,
                    "Account verification required. Please wait for admin approval.".into(),
                    no_fields,
                ),
                DomainError::NotFound(entity) => (
                    StatusCode::NOT_FOUND,
                    format!("{} not found", capitalize(entity)),
                    no_fields,
                ),
                DomainError::InvalidState { entity, expected } => (
                    StatusCode::CONFLICT,
                    format!("{} is not {expected}", capitalize(entity)),
                    no_fields,
                ),
                DomainError::Internal(detail) => {
                    error!(%detail, "request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".into(),
                        no_fields,
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, field_errors) = self.parts();
        let body = ErrorBody {
            success: false,
            message,
            field_errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
