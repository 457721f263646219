// handlers/public/queries.rs - POST /api/queries

use axum::extract::State;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::database::models::NewQuery;
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQueryRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "is required"))]
    pub service: String,
    #[validate(length(min = 1, message = "is required"))]
    pub message: String,
}

/// POST /api/queries - anonymous contact form submission
pub async fn create_query(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateQueryRequest>,
) -> ApiResult<serde_json::Value> {
    let query = state
        .store
        .insert_query(NewQuery {
            name: req.name,
            email: req.email,
            phone: req.phone,
            service: req.service,
            message: req.message,
        })
        .await?;

    tracing::info!("Query {} submitted for service {}", query.id, query.service);

    Ok(ApiResponse::created(json!({ "query_id": query.id }))
        .with_message("Query submitted successfully"))
}
