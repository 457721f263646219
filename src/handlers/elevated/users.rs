// handlers/elevated/users.rs - /api/admin/users

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::api::{ApplicationResponse, Pagination, UserResponse};
use crate::database::models::{ApplicationFilter, UserFilter, UserPatch};
use crate::database::{Entity, Page, Scope};
use crate::error::ApiError;
use crate::handlers::protected::non_blank;
use crate::middleware::{parse_id, ApiResponse, ApiResult, AuthUser, ListParams, ValidJson};
use crate::services::user_stats as count_users;
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/admin/users - all users, optionally filtered by `role`
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<serde_json::Value> {
    let filter = UserFilter {
        role: ListParams::filter(&params.role).map(str::parse::<Role>).transpose()?,
        is_active: None,
    };
    let page = params.page(&state.pagination);

    let (users, total) = state.store.list_users(&filter, page).await?;
    let users: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();

    Ok(ApiResponse::success(json!({
        "users": users,
        "pagination": Pagination { page: page.page, limit: page.limit, total },
    })))
}

/// GET /api/admin/users/:id - the user and their applications
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<serde_json::Value> {
    let id = parse_id(&id)?;
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let total = state
        .store
        .count_applications(Scope::Owner(id), &ApplicationFilter::default())
        .await?;
    let (applications, _) = state
        .store
        .list_applications(Scope::Owner(id), &ApplicationFilter::default(), Page::new(1, total.max(1)))
        .await?;
    let applications: Vec<ApplicationResponse> = applications.iter().map(ApplicationResponse::from).collect();

    Ok(ApiResponse::success(json!({
        "user": UserResponse::from(&user),
        "applications": applications,
    })))
}

/// PUT /api/admin/users/:id - partial update of name, phone, role and active flag
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> ApiResult<serde_json::Value> {
    let id = parse_id(&id)?;
    let patch = UserPatch {
        name: non_blank(req.name),
        phone: non_blank(req.phone),
        role: non_blank(req.role).map(|r| r.parse::<Role>()).transpose()?,
        is_active: req.is_active,
    };

    let user = if patch.is_empty() {
        state.store.find_user(id).await?
    } else {
        state.store.update_user(id, &patch).await?
    }
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(json!({ "user": UserResponse::from(&user) }))
        .with_message("User updated successfully"))
}

/// DELETE /api/admin/users/:id - soft delete; frees the email and phone for reuse
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let id = parse_id(&id)?;
    if id == caller.id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }
    if !state.store.soft_delete(Entity::User, id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    tracing::info!("Admin {} deleted user {}", caller.id, id);
    Ok(ApiResponse::success(json!({ "user_id": id })).with_message("User deleted successfully"))
}

/// GET /api/admin/users/stats
pub async fn user_stats(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let stats = count_users(state.store.as_ref()).await?;
    Ok(ApiResponse::success(json!({ "stats": stats })))
}
