// handlers/protected/applications.rs - /api/user/applications

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::api::Pagination;
use crate::database::models::{ApplicationFilter, NewApplication};
use crate::database::Scope;
use crate::error::ApiError;
use crate::middleware::{parse_id, ApiResponse, ApiResult, AuthUser, ListParams, ValidJson};
use crate::services::{application_stats as count_by_status, expand_application, expand_applications, Includes};
use crate::state::AppState;
use crate::types::ApplicationStatus;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateApplicationRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub service_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub amount: f64,
}

/// Filter built from `status` and `service_type` query parameters
pub fn application_filter(params: &ListParams) -> Result<ApplicationFilter, ApiError> {
    Ok(ApplicationFilter {
        status: ListParams::filter(&params.status).map(str::parse::<ApplicationStatus>).transpose()?,
        service_type: ListParams::filter(&params.service_type).map(String::from),
    })
}

/// GET /api/user/applications - the caller's own applications, newest first
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> ApiResult<serde_json::Value> {
    let filter = application_filter(&params)?;
    let page = params.page(&state.pagination);

    let (applications, total) = state
        .store
        .list_applications(Scope::Owner(user.id), &filter, page)
        .await?;
    let applications = expand_applications(state.store.as_ref(), &applications, Includes::OWN).await?;

    Ok(ApiResponse::success(json!({
        "applications": applications,
        "pagination": Pagination { page: page.page, limit: page.limit, total },
    })))
}

/// POST /api/user/applications - open a new application owned by the caller
pub async fn create_application(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(req): ValidJson<CreateApplicationRequest>,
) -> ApiResult<serde_json::Value> {
    let application = state
        .store
        .insert_application(NewApplication {
            user_id: user.id,
            service_type: req.service_type,
            description: req.description,
            amount: req.amount,
        })
        .await?;

    tracing::info!("User {} created application {}", user.id, application.id);

    Ok(ApiResponse::created(json!({ "application_id": application.id }))
        .with_message("Application created successfully"))
}

/// GET /api/user/applications/:id - own application, or any application for admins
pub async fn get_application(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let id = parse_id(&id)?;
    let application = state
        .store
        .find_application(user.scope(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let application = expand_application(state.store.as_ref(), &application, Includes::ALL).await?;
    Ok(ApiResponse::success(json!({ "application": application })))
}

/// GET /api/user/applications/stats - status buckets over the caller's visible applications
pub async fn application_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<serde_json::Value> {
    let stats = count_by_status(state.store.as_ref(), user.scope()).await?;
    Ok(ApiResponse::success(json!({ "stats": stats })))
}
