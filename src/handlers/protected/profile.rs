// handlers/protected/profile.rs - GET/PUT /api/user/profile

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::api::UserResponse;
use crate::database::models::{User, UserPatch};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::state::AppState;

use super::non_blank;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
}

async fn load_self(state: &AppState, user: &AuthUser) -> Result<User, ApiError> {
    state
        .store
        .find_user(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// GET /api/user/profile - the caller's own account
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<serde_json::Value> {
    let current = load_self(&state, &user).await?;
    Ok(ApiResponse::success(json!({ "user": UserResponse::from(&current) })))
}

/// PUT /api/user/profile - change own name and/or phone; blank fields are ignored
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> ApiResult<serde_json::Value> {
    let patch = UserPatch {
        name: non_blank(req.name),
        phone: non_blank(req.phone),
        ..Default::default()
    };

    let updated = if patch.is_empty() {
        load_self(&state, &user).await?
    } else {
        state
            .store
            .update_user(user.id, &patch)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?
    };

    Ok(ApiResponse::success(json!({ "user": UserResponse::from(&updated) }))
        .with_message("Profile updated successfully"))
}
