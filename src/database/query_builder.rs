//! SQL assembly for the Postgres store. Every statement starts from the soft-delete
//! guard so deleted rows never leak into reads, counts or updates.

use sqlx::{Encode, Postgres, QueryBuilder, Type};

use super::models::{ApplicationFilter, QueryFilter, UserFilter};
use super::store::{Page, Scope};

pub type PgQueryBuilder<'a> = QueryBuilder<'a, Postgres>;

/// `SELECT * FROM <table> WHERE deleted_at IS NULL`
pub fn select_live<'a>(table: &str) -> PgQueryBuilder<'a> {
    QueryBuilder::new(format!("SELECT * FROM {} WHERE deleted_at IS NULL", table))
}

/// `SELECT COUNT(*) FROM <table> WHERE deleted_at IS NULL`
pub fn count_live<'a>(table: &str) -> PgQueryBuilder<'a> {
    QueryBuilder::new(format!("SELECT COUNT(*) FROM {} WHERE deleted_at IS NULL", table))
}

pub fn push_scope(qb: &mut PgQueryBuilder<'_>, scope: Scope) {
    if let Scope::Owner(user_id) = scope {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
}

pub fn push_application_filter(qb: &mut PgQueryBuilder<'_>, filter: &ApplicationFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(service_type) = &filter.service_type {
        qb.push(" AND service_type = ").push_bind(service_type.clone());
    }
}

pub fn push_user_filter(qb: &mut PgQueryBuilder<'_>, filter: &UserFilter) {
    if let Some(role) = filter.role {
        qb.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(is_active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(is_active);
    }
}

pub fn push_query_filter(qb: &mut PgQueryBuilder<'_>, filter: &QueryFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
}

/// Newest-first ordering with a stable tie-break, then the page window
pub fn push_page(qb: &mut PgQueryBuilder<'_>, page: Page) {
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());
}

/// `UPDATE <table> SET updated_at = NOW(), ... WHERE id = $n AND deleted_at IS NULL RETURNING *`
pub struct UpdateBuilder<'a> {
    qb: PgQueryBuilder<'a>,
}

impl<'a> UpdateBuilder<'a> {
    pub fn new(table: &str) -> Self {
        Self {
            qb: QueryBuilder::new(format!("UPDATE {} SET updated_at = NOW()", table)),
        }
    }

    pub fn set<T>(&mut self, column: &str, value: T) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Send + Type<Postgres>,
    {
        self.qb.push(", ").push(column).push(" = ").push_bind(value);
        self
    }

    pub fn set_opt<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Send + Type<Postgres>,
    {
        if let Some(value) = value {
            self.set(column, value);
        }
        self
    }

    pub fn finish(mut self, id: i64) -> PgQueryBuilder<'a> {
        self.qb
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND deleted_at IS NULL RETURNING *");
        self.qb
    }
}
