//! `/api/admin/*`: verification queue, user management and the request
//! overview.

use axum::extract::State;
use axum::Json;
use domains::{DomainError, PageRequest, RequestFilter, Role, UserFilter};
use serde::Deserialize;
use serde_json::{json, Value};
use services::CreateAdminInput;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser, LenientJson};
use crate::handlers::{parse_request_status, pagination};
use crate::state::AppState;

pub async fn list_verifications(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
) -> ApiResult<Json<Value>> {
    let users = state.verification.list_pending(&admin).await?;
    Ok(Json(json!({ "success": true, "users": users })))
}

pub async fn verification_detail(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let user = state.verification.detail(&admin, user_id).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

pub async fn approve_verification(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let user = state.verification.approve(&admin, user_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "User verification approved",
        "user": user,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RejectBody {
    reason: Option<String>,
}

pub async fn reject_verification(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(user_id): ApiPath<i64>,
    LenientJson(body): LenientJson<RejectBody>,
) -> ApiResult<Json<Value>> {
    let user = state.verification.reject(&admin, user_id, body.reason).await?;
    Ok(Json(json!({
        "success": true,
        "message": "User verification rejected",
        "user": user,
    })))
}

pub async fn rejection_history(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let rejections = state.verification.history(&admin, user_id).await?;
    Ok(Json(json!({ "success": true, "rejections": rejections })))
}

pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
) -> ApiResult<Json<Value>> {
    let stats = state.admin.dashboard(&admin).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UsersQuery {
    page: Option<u32>,
    limit: Option<u32>,
    /// Verification flag: `true`/`1` or `false`/`0`.
    status: Option<String>,
    role: Option<String>,
}

impl UsersQuery {
    fn filter(&self) -> Result<UserFilter, DomainError> {
        let verified = match self.status.as_deref().map(str::trim) {
            Some("true" | "1" | "verified") => Some(true),
            Some("false" | "0" | "unverified") => Some(false),
            _ => None,
        };
        let role = match self.role.as_deref().map(str::trim) {
            None | Some("" | "all") => None,
            Some(role) => Some(
                role.parse::<Role>()
                    .map_err(|_| DomainError::field("role", "Role must be resident or admin"))?,
            ),
        };
        Ok(UserFilter { role, verified })
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiQuery(query): ApiQuery<UsersQuery>,
) -> ApiResult<Json<Value>> {
    let page = PageRequest::new(query.page, query.limit);
    let users = state.admin.list_users(&admin, query.filter()?, page).await?;
    Ok(Json(json!({
        "success": true,
        "pagination": pagination(&users),
        "users": users.items,
    })))
}

pub async fn create_admin(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiJson(input): ApiJson<CreateAdminInput>,
) -> ApiResult<Json<Value>> {
    let user = state.admin.create_admin(&admin, input).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Admin user created successfully",
        "user": user,
    })))
}

pub async fn list_admins(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
) -> ApiResult<Json<Value>> {
    let admins = state.admin.list_admins(&admin).await?;
    Ok(Json(json!({ "success": true, "admins": admins })))
}

pub async fn delete_admin(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(admin_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    state.admin.delete_admin(&admin, admin_id).await?;
    Ok(Json(json!({ "success": true, "message": "Admin user deleted successfully" })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminRequestsQuery {
    /// A request status, or `all` (the default).
    status: Option<String>,
    search: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub async fn list_requests(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiQuery(query): ApiQuery<AdminRequestsQuery>,
) -> ApiResult<Json<Value>> {
    let filter = RequestFilter {
        status: parse_request_status(query.status.as_deref())?,
        search: query.search,
    };
    let page = PageRequest::new(query.page, Some(query.limit.unwrap_or(10)));
    let requests = state.requests.list_admin(&admin, filter, page).await?;
    Ok(Json(json!({
        "success": true,
        "totalCount": requests.total,
        "totalPages": requests.total_pages(),
        "currentPage": requests.page,
        "requests": requests.items,
    })))
}
