// handlers/protected/dashboard.rs - GET /api/user/dashboard

use axum::{extract::State, Extension};
use serde_json::json;

use crate::api::UserResponse;
use crate::database::models::ApplicationFilter;
use crate::database::Page;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{application_stats, expand_applications, query_stats, Includes};
use crate::state::AppState;

const RECENT_APPLICATIONS: i64 = 5;

/// GET /api/user/dashboard - application counts and the most recent applications.
/// Admins see platform-wide numbers plus query counts.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<serde_json::Value> {
    let store = state.store.as_ref();
    let scope = user.scope();

    let current = store
        .find_user(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let stats = application_stats(store, scope).await?;

    let (recent, _) = store
        .list_applications(scope, &ApplicationFilter::default(), Page::new(1, RECENT_APPLICATIONS))
        .await?;
    let recent = expand_applications(store, &recent, Includes::ASSIGNEE).await?;

    let mut body = json!({
        "user": UserResponse::from(&current),
        "application_stats": stats,
        "recent_applications": recent,
    });

    if user.is_admin() {
        body["admin_stats"] = json!({ "queries": query_stats(store).await? });
    }

    Ok(ApiResponse::success(body))
}
