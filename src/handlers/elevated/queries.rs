// handlers/elevated/queries.rs - /api/admin/queries

use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::api::Pagination;
use crate::database::models::{QueryFilter, QueryPatch};
use crate::database::Entity;
use crate::error::ApiError;
use crate::handlers::protected::non_blank;
use crate::middleware::{parse_id, ApiResponse, ApiResult, ListParams, ValidJson};
use crate::services::{expand_queries, expand_query, query_stats as count_by_status};
use crate::state::AppState;
use crate::types::QueryStatus;

use super::ensure_user_exists;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateQueryRequest {
    pub status: Option<String>,
    pub assigned_to: Option<i64>,
    pub notes: Option<String>,
}

/// GET /api/admin/queries - all queries, optionally filtered by `status`
pub async fn list_queries(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<serde_json::Value> {
    let filter = QueryFilter {
        status: ListParams::filter(&params.status)
            .map(str::parse::<QueryStatus>)
            .transpose()?,
    };
    let page = params.page(&state.pagination);

    let (queries, total) = state.store.list_queries(&filter, page).await?;
    let queries = expand_queries(state.store.as_ref(), &queries).await?;

    Ok(ApiResponse::success(json!({
        "queries": queries,
        "pagination": Pagination { page: page.page, limit: page.limit, total },
    })))
}

/// GET /api/admin/queries/:id
pub async fn get_query(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<serde_json::Value> {
    let id = parse_id(&id)?;
    let query = state
        .store
        .find_query(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Query not found"))?;

    let query = expand_query(state.store.as_ref(), &query).await?;
    Ok(ApiResponse::success(json!({ "query": query })))
}

/// PUT /api/admin/queries/:id - partial update of status, assignee and notes
pub async fn update_query(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateQueryRequest>,
) -> ApiResult<serde_json::Value> {
    let id = parse_id(&id)?;
    let store = state.store.as_ref();

    let patch = QueryPatch {
        status: non_blank(req.status)
            .map(|s| s.parse::<QueryStatus>())
            .transpose()?,
        assigned_to: req.assigned_to,
        notes: non_blank(req.notes),
    };
    if let Some(assignee) = patch.assigned_to {
        ensure_user_exists(store, assignee).await?;
    }

    let query = if patch.is_empty() {
        store.find_query(id).await?
    } else {
        store.update_query(id, &patch).await?
    }
    .ok_or_else(|| ApiError::not_found("Query not found"))?;

    let query = expand_query(store, &query).await?;
    Ok(ApiResponse::success(json!({ "query": query })).with_message("Query updated successfully"))
}

/// DELETE /api/admin/queries/:id - soft delete
pub async fn delete_query(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<serde_json::Value> {
    let id = parse_id(&id)?;
    if !state.store.soft_delete(Entity::Query, id).await? {
        return Err(ApiError::not_found("Query not found"));
    }
    Ok(ApiResponse::success(json!({ "query_id": id })).with_message("Query deleted successfully"))
}

/// GET /api/admin/queries/stats
pub async fn query_stats(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let stats = count_by_status(state.store.as_ref()).await?;
    Ok(ApiResponse::success(json!({ "stats": stats })))
}
