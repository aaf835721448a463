//! `/api/items/*`

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use domains::{ItemCondition, ItemFilter, ItemType};
use serde::Deserialize;
use serde_json::{json, Value};
use services::NewItemInput;

use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery, CurrentUser, MultipartForm};
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    mut form: MultipartForm,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input = NewItemInput {
        item_type: form.text("type"),
        name: form.text("name"),
        description: form.text("description"),
        condition: form.text("condition"),
        due_date: form.text("due_date"),
    };
    let photo = form.take_file("photo");
    let item = state.items.create(&identity, input, photo).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Item submitted for approval",
            "item": item,
        })),
    ))
}

/// Catalog filters. Unknown `type`/`condition` values match nothing rather
/// than being ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    q: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
    condition: Option<String>,
    barangay: Option<String>,
}

pub async fn list_available(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ApiQuery(query): ApiQuery<CatalogQuery>,
) -> ApiResult<Json<Value>> {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let item_type = non_empty(query.item_type);
    let condition = non_empty(query.condition);

    let parsed_type = item_type.as_deref().map(str::parse::<ItemType>).transpose();
    let parsed_condition = condition.as_deref().map(str::parse::<ItemCondition>).transpose();
    let (Ok(item_type), Ok(condition)) = (parsed_type, parsed_condition) else {
        return Ok(Json(json!({ "success": true, "items": [] })));
    };

    let filter = ItemFilter {
        item_type,
        condition,
        barangay: non_empty(query.barangay),
        q: non_empty(query.q),
    };
    let items = state.items.list_available(&identity, filter).await?;
    Ok(Json(json!({ "success": true, "items": items })))
}

pub async fn list_mine(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Value>> {
    let items = state.items.list_mine(&identity).await?;
    Ok(Json(json!({ "success": true, "items": items })))
}

pub async fn list_pending(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
) -> ApiResult<Json<Value>> {
    let items = state.items.list_pending(&admin).await?;
    Ok(Json(json!({ "success": true, "items": items })))
}

pub async fn approve(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(item_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let item = state.items.approve(&admin, item_id).await?;
    Ok(Json(json!({ "success": true, "message": "Item approved", "item": item })))
}

pub async fn reject(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(item_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let item = state.items.reject(&admin, item_id).await?;
    Ok(Json(json!({ "success": true, "message": "Item rejected", "item": item })))
}
