// handlers/mod.rs - Three-tier handler layout
//
// Public (no auth) → Protected (bearer token) → Elevated (bearer token + admin role)

pub mod elevated;
pub mod protected;
pub mod public;
