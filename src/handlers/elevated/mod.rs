// handlers/elevated/mod.rs - Admin handlers (bearer token with the admin role)
//
// Mounted under /api/admin behind both the token check and the role check, so a
// non-admin is turned away with 403 before any body is parsed.

pub mod applications;
pub mod queries;
pub mod users;

use crate::database::Store;
use crate::error::ApiError;

/// Assignment targets must be live users
pub(crate) async fn ensure_user_exists(store: &dyn Store, id: i64) -> Result<(), ApiError> {
    match store.find_user(id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::bad_request(format!("Assigned user {} not found", id))),
    }
}
