// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here receives the resolved caller as `Extension<AuthUser>`.
// Application reads go through `AuthUser::scope`, so admins see every row and
// everyone else sees their own.

pub mod applications;
pub mod dashboard;
pub mod documents;
pub mod profile;

pub use applications::{application_stats, create_application, get_application, list_applications};
pub use dashboard::dashboard;
pub use documents::{list_documents, upload_document};
pub use profile::{get_profile, update_profile};

/// Blank strings mean "not supplied" in partial updates
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
