pub mod account_service;
pub mod document_service;
pub mod relations;
pub mod stats_service;

pub use account_service::{AccountError, AccountService, Registration};
pub use document_service::{DocumentError, DocumentService, Upload};
pub use relations::{expand_application, expand_applications, expand_queries, expand_query, Includes};
pub use stats_service::{application_stats, query_stats, user_stats, ApplicationStats, QueryStats, UserStats};
