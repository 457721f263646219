//! Persistence port consumed by services and handlers.
//!
//! Every read excludes soft-deleted rows. Application reads additionally take a
//! [`Scope`] so the "admins see everything, users see their own rows" rule lives in
//! one place instead of being re-derived per handler.

use async_trait::async_trait;

use super::models::{
    Application, ApplicationFilter, ApplicationPatch, Document, NewApplication, NewDocument,
    NewQuery, NewUser, Query, QueryFilter, QueryPatch, User, UserFilter, UserPatch,
};
use super::DatabaseError;

/// Row-visibility predicate derived from the caller's role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// No restriction (administrators)
    All,
    /// Only rows owned by this user id
    Owner(i64),
}

impl Scope {
    pub fn permits(&self, owner_id: i64) -> bool {
        match self {
            Scope::All => true,
            Scope::Owner(id) => *id == owner_id,
        }
    }
}

/// One page of a newest-first listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Soft-deletable entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Application,
    Query,
    Document,
}

impl Entity {
    pub fn table(&self) -> &'static str {
        match self {
            Entity::User => "users",
            Entity::Application => "applications",
            Entity::Query => "queries",
            Entity::Document => "documents",
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe
    async fn ping(&self) -> Result<(), DatabaseError>;

    // Users
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_email_or_phone(&self, email: &str, phone: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_users(&self, ids: &[i64]) -> Result<Vec<User>, DatabaseError>;
    async fn list_users(&self, filter: &UserFilter, page: Page) -> Result<(Vec<User>, i64), DatabaseError>;
    async fn count_users(&self, filter: &UserFilter) -> Result<i64, DatabaseError>;
    async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, DatabaseError>;
    /// Physically removes users with this email, including soft-deleted ones
    async fn purge_user_by_email(&self, email: &str) -> Result<u64, DatabaseError>;

    // Applications
    async fn insert_application(&self, application: NewApplication) -> Result<Application, DatabaseError>;
    async fn find_application(&self, scope: Scope, id: i64) -> Result<Option<Application>, DatabaseError>;
    async fn list_applications(
        &self,
        scope: Scope,
        filter: &ApplicationFilter,
        page: Page,
    ) -> Result<(Vec<Application>, i64), DatabaseError>;
    async fn count_applications(&self, scope: Scope, filter: &ApplicationFilter) -> Result<i64, DatabaseError>;
    async fn update_application(&self, id: i64, patch: &ApplicationPatch) -> Result<Option<Application>, DatabaseError>;

    // Queries
    async fn insert_query(&self, query: NewQuery) -> Result<Query, DatabaseError>;
    async fn find_query(&self, id: i64) -> Result<Option<Query>, DatabaseError>;
    async fn list_queries(&self, filter: &QueryFilter, page: Page) -> Result<(Vec<Query>, i64), DatabaseError>;
    async fn count_queries(&self, filter: &QueryFilter) -> Result<i64, DatabaseError>;
    async fn update_query(&self, id: i64, patch: &QueryPatch) -> Result<Option<Query>, DatabaseError>;

    // Documents
    async fn insert_document(&self, document: NewDocument) -> Result<Document, DatabaseError>;
    async fn documents_for(&self, application_ids: &[i64]) -> Result<Vec<Document>, DatabaseError>;

    /// Marks a row deleted; returns false when it was absent or already deleted
    async fn soft_delete(&self, entity: Entity, id: i64) -> Result<bool, DatabaseError>;
}
