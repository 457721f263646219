use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::database::models::{Document, NewDocument};
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("File is empty")]
    Empty,
    #[error("File exceeds the maximum size of {0} bytes")]
    TooLarge(u64),
    #[error("Failed to store file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Empty | DocumentError::TooLarge(_) => ApiError::bad_request(err.to_string()),
            DocumentError::Io(e) => {
                tracing::error!("Upload write failed: {}", e);
                ApiError::internal_server_error("Failed to store file")
            }
            DocumentError::Database(e) => e.into(),
        }
    }
}

/// An uploaded file held in memory before it is written out
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub description: String,
    pub bytes: Vec<u8>,
}

/// Writes uploads under `<upload_path>/<application_id>/` and records them
pub struct DocumentService<'a> {
    store: &'a dyn Store,
    config: &'a UploadConfig,
}

impl<'a> DocumentService<'a> {
    pub fn new(store: &'a dyn Store, config: &'a UploadConfig) -> Self {
        Self { store, config }
    }

    pub async fn save(&self, application_id: i64, upload: Upload) -> Result<Document, DocumentError> {
        if upload.bytes.is_empty() {
            return Err(DocumentError::Empty);
        }
        if upload.bytes.len() as u64 > self.config.max_file_size {
            return Err(DocumentError::TooLarge(self.config.max_file_size));
        }

        let dir = Path::new(&self.config.upload_path).join(application_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = sanitize(&upload.file_name);
        let path: PathBuf = dir.join(format!("{}_{}", Uuid::new_v4(), file_name));
        tokio::fs::write(&path, &upload.bytes).await?;

        let document = self
            .store
            .insert_document(NewDocument {
                application_id,
                file_name,
                file_path: path.to_string_lossy().into_owned(),
                file_size: upload.bytes.len() as i64,
                file_type: upload.content_type,
                description: upload.description,
            })
            .await;

        match document {
            Ok(document) => {
                info!("Stored document {} for application {}", document.id, application_id);
                Ok(document)
            }
            Err(e) => {
                // Don't leave an orphaned file behind
                let _ = tokio::fs::remove_file(&path).await;
                Err(e.into())
            }
        }
    }

    pub async fn list(&self, application_id: i64) -> Result<Vec<Document>, DocumentError> {
        Ok(self.store.documents_for(&[application_id]).await?)
    }
}

/// Keeps only the final path component and replaces anything outside a safe set
fn sanitize(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
