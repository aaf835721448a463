pub mod admin;
pub mod auth;
pub mod items;
pub mod requests;

use axum::Json;
use domains::{DomainError, Paginated, RequestStatus};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "message": "BarangayLink API is running" }))
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// `{page, limit, total, pages}` block used by the paginated listings.
pub(crate) fn pagination<T>(page: &Paginated<T>) -> Value {
    json!({
        "page": page.page,
        "limit": page.limit,
        "total": page.total,
        "pages": page.total_pages(),
    })
}

/// Empty and `all` mean no filter.
pub(crate) fn parse_request_status(raw: Option<&str>) -> ApiResult<Option<RequestStatus>> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(status) => status
            .parse()
            .map(Some)
            .map_err(|_| DomainError::field("status", "Status must be pending, approved or denied").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_means_no_status_filter() {
        assert_eq!(parse_request_status(Some("all")).unwrap(), None);
        assert_eq!(parse_request_status(None).unwrap(), None);
        assert_eq!(
            parse_request_status(Some("denied")).unwrap(),
            Some(RequestStatus::Denied)
        );
        assert!(parse_request_status(Some("borrowed")).is_err());
    }
}
