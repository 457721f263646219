// handlers/protected/documents.rs - GET/POST /api/user/applications/:id/documents

use axum::{
    extract::{Multipart, Path, State},
    Extension,
};
use serde_json::json;

use crate::api::DocumentResponse;
use crate::database::models::Application;
use crate::error::ApiError;
use crate::middleware::{parse_id, ApiResponse, ApiResult, AuthUser};
use crate::services::{DocumentService, Upload};
use crate::state::AppState;

async fn visible_application(state: &AppState, user: &AuthUser, raw_id: &str) -> Result<Application, ApiError> {
    let id = parse_id(raw_id)?;
    state
        .store
        .find_application(user.scope(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))
}

/// GET /api/user/applications/:id/documents
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let application = visible_application(&state, &user, &id).await?;
    let documents = DocumentService::new(state.store.as_ref(), &state.uploads)
        .list(application.id)
        .await?;

    let documents: Vec<DocumentResponse> = documents.iter().map(DocumentResponse::from).collect();
    Ok(ApiResponse::success(json!({ "documents": documents })))
}

/// POST /api/user/applications/:id/documents - multipart `file` plus optional `description`
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<serde_json::Value> {
    let application = visible_application(&state, &user, &id).await?;

    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text())))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e.body_text())))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("description") => {
                description = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) = file.ok_or_else(|| ApiError::bad_request("Missing file field"))?;

    let document = DocumentService::new(state.store.as_ref(), &state.uploads)
        .save(
            application.id,
            Upload {
                file_name,
                content_type,
                description,
                bytes,
            },
        )
        .await?;

    Ok(ApiResponse::created(json!({ "document": DocumentResponse::from(&document) }))
        .with_message("Document uploaded successfully"))
}
