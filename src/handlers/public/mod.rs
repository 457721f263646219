// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, the contact form, and the health probe.

pub mod auth;
pub mod health;
pub mod queries;

pub use auth::{login, register};
pub use health::{health, root};
pub use queries::create_query;
