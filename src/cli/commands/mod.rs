pub mod admin;
pub mod ping;
