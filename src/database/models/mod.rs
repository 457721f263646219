pub mod application;
pub mod document;
pub mod query;
pub mod user;

pub use application::{Application, ApplicationFilter, ApplicationPatch, NewApplication};
pub use document::{Document, NewDocument};
pub use query::{NewQuery, Query, QueryFilter, QueryPatch};
pub use user::{NewUser, User, UserFilter, UserPatch};
