//! `/api/auth/*`: registration, login and account self-service.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use services::{
    ChangePasswordInput, LoginInput, ProfileInput, RegisterResidentInput, ResidentDocuments,
};

use crate::error::ApiResult;
use crate::extract::{ApiJson, CurrentUser, MultipartForm};
use crate::state::AppState;

pub async fn register_resident(
    State(state): State<AppState>,
    mut form: MultipartForm,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let field = |name: &str| form.text(name).unwrap_or_default();
    let input = RegisterResidentInput {
        username: field("username"),
        full_name: field("full_name"),
        email: field("email"),
        password: field("password"),
        contact_number: field("contact_number"),
        barangay: field("barangay"),
        municipality: field("municipality"),
        province: field("province"),
    };
    let documents = ResidentDocuments {
        valid_id: form.take_file("valid_id"),
        selfie_with_id: form.take_file("selfie_with_id"),
    };

    let registration = state.accounts.register_resident(input, documents).await?;
    let (status, message) = if registration.resubmitted {
        (
            StatusCode::OK,
            "Your previous application was rejected. We have updated your details and resubmitted for approval.",
        )
    } else {
        (
            StatusCode::CREATED,
            "Account created successfully. Please wait for admin approval before you can use all features.",
        )
    };
    Ok((
        status,
        Json(json!({
            "success": true,
            "message": message,
            "user": registration.user,
            "token": registration.token,
        })),
    ))
}

pub async fn register_admin(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.accounts.register_admin()?;
    Ok(Json(json!({ "success": true })))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> ApiResult<Json<Value>> {
    let session = state.accounts.login(input).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "user": session.user,
        "token": session.token,
    })))
}

/// Tokens are stateless; the client simply drops its copy.
pub async fn logout() -> Json<Value> {
    Json(json!({ "success": true, "message": "Logout successful" }))
}

pub async fn verify(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Value>> {
    let user = state.accounts.current_user(&identity).await?;
    Ok(Json(json!({ "success": true, "message": "Token is valid", "user": user })))
}

pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Value>> {
    let user = state.accounts.current_user(&identity).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ApiJson(input): ApiJson<ProfileInput>,
) -> ApiResult<Json<Value>> {
    let user = state.accounts.update_profile(&identity, input).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": user,
    })))
}

pub async fn update_profile_picture(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    mut form: MultipartForm,
) -> ApiResult<Json<Value>> {
    let picture = form.take_file("profile_picture");
    let user = state.accounts.set_profile_picture(&identity, picture).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Profile picture updated successfully",
        "user": user,
    })))
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    ApiJson(input): ApiJson<ChangePasswordInput>,
) -> ApiResult<Json<Value>> {
    state.accounts.change_password(&identity, input).await?;
    Ok(Json(json!({ "success": true, "message": "Password changed successfully" })))
}
