use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::QueryStatus;

/// Anonymous contact-form submission
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Query {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub status: QueryStatus,
    pub assigned_to: Option<i64>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewQuery {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct QueryPatch {
    pub status: Option<QueryStatus>,
    pub assigned_to: Option<i64>,
    pub notes: Option<String>,
}

impl QueryPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assigned_to.is_none() && self.notes.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryFilter {
    pub status: Option<QueryStatus>,
}
