// handlers/elevated/applications.rs - /api/admin/applications

use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::api::Pagination;
use crate::database::models::ApplicationPatch;
use crate::database::{Entity, Scope};
use crate::error::ApiError;
use crate::handlers::protected::{applications::application_filter, non_blank};
use crate::middleware::{parse_id, ApiResponse, ApiResult, ListParams, ValidJson};
use crate::services::{application_stats as count_by_status, expand_application, expand_applications, Includes};
use crate::state::AppState;
use crate::types::{ApplicationStatus, PaymentStatus};

use super::ensure_user_exists;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateApplicationRequest {
    pub status: Option<String>,
    pub progress: Option<String>,
    pub payment_status: Option<String>,
    pub assigned_ca: Option<i64>,
    pub notes: Option<String>,
    pub amount: Option<f64>,
}

impl UpdateApplicationRequest {
    /// Blank strings and a non-positive amount count as "not supplied"
    fn into_patch(self) -> Result<ApplicationPatch, ApiError> {
        Ok(ApplicationPatch {
            status: non_blank(self.status)
                .map(|s| s.parse::<ApplicationStatus>())
                .transpose()?,
            progress: non_blank(self.progress),
            payment_status: non_blank(self.payment_status)
                .map(|s| s.parse::<PaymentStatus>())
                .transpose()?,
            assigned_ca: self.assigned_ca,
            notes: non_blank(self.notes),
            amount: self.amount.filter(|a| *a > 0.0),
        })
    }
}

/// GET /api/admin/applications - every application with owner, assignee and documents
pub async fn list_applications(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<serde_json::Value> {
    let filter = application_filter(&params)?;
    let page = params.page(&state.pagination);

    let (applications, total) = state.store.list_applications(Scope::All, &filter, page).await?;
    let applications = expand_applications(state.store.as_ref(), &applications, Includes::ALL).await?;

    Ok(ApiResponse::success(json!({
        "applications": applications,
        "pagination": Pagination { page: page.page, limit: page.limit, total },
    })))
}

/// GET /api/admin/applications/:id
pub async fn get_application(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<serde_json::Value> {
    let id = parse_id(&id)?;
    let application = state
        .store
        .find_application(Scope::All, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let application = expand_application(state.store.as_ref(), &application, Includes::ALL).await?;
    Ok(ApiResponse::success(json!({ "application": application })))
}

/// PUT /api/admin/applications/:id - partial update; omitted fields keep their values
pub async fn update_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateApplicationRequest>,
) -> ApiResult<serde_json::Value> {
    let id = parse_id(&id)?;
    let store = state.store.as_ref();

    let patch = req.into_patch()?;
    if let Some(assignee) = patch.assigned_ca {
        ensure_user_exists(store, assignee).await?;
    }

    let application = if patch.is_empty() {
        store.find_application(Scope::All, id).await?
    } else {
        store.update_application(id, &patch).await?
    }
    .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let application = expand_application(store, &application, Includes::ALL).await?;
    Ok(ApiResponse::success(json!({ "application": application }))
        .with_message("Application updated successfully"))
}

/// DELETE /api/admin/applications/:id - soft delete
pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let id = parse_id(&id)?;
    if !state.store.soft_delete(Entity::Application, id).await? {
        return Err(ApiError::not_found("Application not found"));
    }
    Ok(ApiResponse::success(json!({ "application_id": id }))
        .with_message("Application deleted successfully"))
}

/// GET /api/admin/applications/stats - platform-wide status buckets
pub async fn application_stats(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let stats = count_by_status(state.store.as_ref(), Scope::All).await?;
    Ok(ApiResponse::success(json!({ "stats": stats })))
}
