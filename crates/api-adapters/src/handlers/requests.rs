//! `/api/requests/*`

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use domains::{PageRequest, RequestFilter};
use serde::Deserialize;
use serde_json::{json, Value};
use services::NewRequestInput;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser, LenientJson};
use crate::handlers::{pagination, parse_request_status};
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ApiJson(input): ApiJson<NewRequestInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request = state.requests.create(&identity, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Request submitted successfully. Waiting for admin approval.",
            "request": request,
        })),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestsQuery {
    status: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub async fn list_admin(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiQuery(query): ApiQuery<RequestsQuery>,
) -> ApiResult<Json<Value>> {
    let filter = RequestFilter {
        status: parse_request_status(query.status.as_deref())?,
        search: None,
    };
    let page = PageRequest::new(query.page, query.limit);
    let requests = state.requests.list_admin(&admin, filter, page).await?;
    Ok(Json(json!({
        "success": true,
        "pagination": pagination(&requests),
        "requests": requests.items,
    })))
}

pub async fn list_mine(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Value>> {
    let requests = state.requests.list_mine(&identity).await?;
    Ok(Json(json!({ "success": true, "requests": requests })))
}

pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ApiPath(request_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let request = state.requests.detail(&identity, request_id).await?;
    Ok(Json(json!({ "success": true, "request": request })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DecisionBody {
    remarks: Option<String>,
}

pub async fn approve(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(request_id): ApiPath<i64>,
    LenientJson(body): LenientJson<DecisionBody>,
) -> ApiResult<Json<Value>> {
    let request = state.requests.approve(&admin, request_id, body.remarks).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Request approved successfully",
        "request": request,
    })))
}

pub async fn deny(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(request_id): ApiPath<i64>,
    LenientJson(body): LenientJson<DecisionBody>,
) -> ApiResult<Json<Value>> {
    let request = state.requests.deny(&admin, request_id, body.remarks).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Request denied successfully",
        "request": request,
    })))
}
