pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{admin_only_middleware, jwt_auth_middleware, AuthUser};
pub use extract::{parse_id, ListParams, ValidJson};
pub use response::{ApiResponse, ApiResult};
