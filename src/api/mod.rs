pub mod format;

pub use format::{ApplicationResponse, DocumentResponse, Pagination, QueryResponse, UserResponse};
