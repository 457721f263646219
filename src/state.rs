use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::{PaginationConfig, UploadConfig};
use crate::database::Store;

/// Shared handles every handler receives through `State`
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub uploads: UploadConfig,
    pub pagination: PaginationConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: TokenService,
        uploads: UploadConfig,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            uploads,
            pagination,
        }
    }
}
