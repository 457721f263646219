//! In-process [`Store`] used by the integration tests and for running the API
//! without Postgres. Mirrors the SQL adapter: soft-delete guards, partial unique
//! indexes on live users, newest-first ordering with an id tie-break.

use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{
    application::DEFAULT_PROGRESS, Application, ApplicationFilter, ApplicationPatch, Document,
    NewApplication, NewDocument, NewQuery, NewUser, Query, QueryFilter, QueryPatch, User,
    UserFilter, UserPatch,
};
use super::store::{Entity, Page, Scope, Store};
use crate::types::{ApplicationStatus, PaymentStatus, QueryStatus};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    applications: Vec<Application>,
    queries: Vec<Query>,
    documents: Vec<Document>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_user_conflict(&self, except: Option<i64>, email: Option<&str>, phone: Option<&str>) -> Option<&'static str> {
        let live = self
            .users
            .iter()
            .filter(|u| u.deleted_at.is_none() && Some(u.id) != except);
        for user in live {
            if email == Some(user.email.as_str()) {
                return Some("users_email_live_idx");
            }
            if phone == Some(user.phone.as_str()) {
                return Some("users_phone_live_idx");
            }
        }
        None
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sorts newest-first and cuts out the requested page
fn paginate<T: Clone>(mut rows: Vec<T>, page: Page, key: impl Fn(&T) -> (chrono::DateTime<Utc>, i64)) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    rows.sort_by_key(|row| Reverse(key(row)));
    let rows = rows
        .into_iter()
        .skip(page.offset().max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect();
    (rows, total)
}

fn matches_application(app: &Application, scope: Scope, filter: &ApplicationFilter) -> bool {
    app.deleted_at.is_none()
        && scope.permits(app.user_id)
        && filter.status.map_or(true, |s| app.status == s)
        && filter
            .service_type
            .as_deref()
            .map_or(true, |t| app.service_type == t)
}

fn matches_user(user: &User, filter: &UserFilter) -> bool {
    user.deleted_at.is_none()
        && filter.role.map_or(true, |r| user.role == r)
        && filter.is_active.map_or(true, |a| user.is_active == a)
}

fn matches_query(query: &Query, filter: &QueryFilter) -> bool {
    query.deleted_at.is_none() && filter.status.map_or(true, |s| query.status == s)
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(index) = tables.live_user_conflict(None, Some(&user.email), Some(&user.phone)) {
            return Err(DatabaseError::Conflict(index.to_string()));
        }

        let now = Utc::now();
        let row = User {
            id: tables.next_id(),
            email: user.email,
            phone: user.phone,
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
            is_active: user.is_active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_user_by_email_or_phone(&self, email: &str, phone: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.deleted_at.is_none() && (u.email == email || u.phone == phone))
            .cloned())
    }

    async fn find_users(&self, ids: &[i64]) -> Result<Vec<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| u.deleted_at.is_none() && ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list_users(&self, filter: &UserFilter, page: Page) -> Result<(Vec<User>, i64), DatabaseError> {
        let tables = self.tables.read().await;
        let rows: Vec<User> = tables
            .users
            .iter()
            .filter(|u| matches_user(u, filter))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |u| (u.created_at, u.id)))
    }

    async fn count_users(&self, filter: &UserFilter) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().filter(|u| matches_user(u, filter)).count() as i64)
    }

    async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(index) = tables.live_user_conflict(Some(id), None, patch.phone.as_deref()) {
            return Err(DatabaseError::Conflict(index.to_string()));
        }

        let Some(user) = tables
            .users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            user.name = name.clone();
        }
        if let Some(phone) = &patch.phone {
            user.phone = phone.clone();
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(is_active) = patch.is_active {
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn purge_user_by_email(&self, email: &str) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.email != email);
        Ok((before - tables.users.len()) as u64)
    }

    async fn insert_application(&self, application: NewApplication) -> Result<Application, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables
            .users
            .iter()
            .any(|u| u.id == application.user_id)
        {
            return Err(DatabaseError::QueryError(format!(
                "user {} does not exist",
                application.user_id
            )));
        }

        let now = Utc::now();
        let row = Application {
            id: tables.next_id(),
            user_id: application.user_id,
            service_type: application.service_type,
            status: ApplicationStatus::Pending,
            progress: DEFAULT_PROGRESS.to_string(),
            payment_status: PaymentStatus::Pending,
            amount: application.amount,
            description: application.description,
            assigned_ca: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.applications.push(row.clone());
        Ok(row)
    }

    async fn find_application(&self, scope: Scope, id: i64) -> Result<Option<Application>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .find(|a| a.id == id && a.deleted_at.is_none() && scope.permits(a.user_id))
            .cloned())
    }

    async fn list_applications(
        &self,
        scope: Scope,
        filter: &ApplicationFilter,
        page: Page,
    ) -> Result<(Vec<Application>, i64), DatabaseError> {
        let tables = self.tables.read().await;
        let rows: Vec<Application> = tables
            .applications
            .iter()
            .filter(|a| matches_application(a, scope, filter))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |a| (a.created_at, a.id)))
    }

    async fn count_applications(&self, scope: Scope, filter: &ApplicationFilter) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .filter(|a| matches_application(a, scope, filter))
            .count() as i64)
    }

    async fn update_application(&self, id: i64, patch: &ApplicationPatch) -> Result<Option<Application>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(app) = tables
            .applications
            .iter_mut()
            .find(|a| a.id == id && a.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(status) = patch.status {
            app.status = status;
        }
        if let Some(progress) = &patch.progress {
            app.progress = progress.clone();
        }
        if let Some(payment_status) = patch.payment_status {
            app.payment_status = payment_status;
        }
        if let Some(assigned_ca) = patch.assigned_ca {
            app.assigned_ca = Some(assigned_ca);
        }
        if let Some(notes) = &patch.notes {
            app.notes = notes.clone();
        }
        if let Some(amount) = patch.amount {
            app.amount = amount;
        }
        app.updated_at = Utc::now();
        Ok(Some(app.clone()))
    }

    async fn insert_query(&self, query: NewQuery) -> Result<Query, DatabaseError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let row = Query {
            id: tables.next_id(),
            name: query.name,
            email: query.email,
            phone: query.phone,
            service: query.service,
            message: query.message,
            status: QueryStatus::New,
            assigned_to: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.queries.push(row.clone());
        Ok(row)
    }

    async fn find_query(&self, id: i64) -> Result<Option<Query>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .queries
            .iter()
            .find(|q| q.id == id && q.deleted_at.is_none())
            .cloned())
    }

    async fn list_queries(&self, filter: &QueryFilter, page: Page) -> Result<(Vec<Query>, i64), DatabaseError> {
        let tables = self.tables.read().await;
        let rows: Vec<Query> = tables
            .queries
            .iter()
            .filter(|q| matches_query(q, filter))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |q| (q.created_at, q.id)))
    }

    async fn count_queries(&self, filter: &QueryFilter) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.queries.iter().filter(|q| matches_query(q, filter)).count() as i64)
    }

    async fn update_query(&self, id: i64, patch: &QueryPatch) -> Result<Option<Query>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(query) = tables
            .queries
            .iter_mut()
            .find(|q| q.id == id && q.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(status) = patch.status {
            query.status = status;
        }
        if let Some(assigned_to) = patch.assigned_to {
            query.assigned_to = Some(assigned_to);
        }
        if let Some(notes) = &patch.notes {
            query.notes = notes.clone();
        }
        query.updated_at = Utc::now();
        Ok(Some(query.clone()))
    }

    async fn insert_document(&self, document: NewDocument) -> Result<Document, DatabaseError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let row = Document {
            id: tables.next_id(),
            application_id: document.application_id,
            file_name: document.file_name,
            file_path: document.file_path,
            file_size: document.file_size,
            file_type: document.file_type,
            description: document.description,
            uploaded_at: now,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.documents.push(row.clone());
        Ok(row)
    }

    async fn documents_for(&self, application_ids: &[i64]) -> Result<Vec<Document>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .documents
            .iter()
            .filter(|d| d.deleted_at.is_none() && application_ids.contains(&d.application_id))
            .cloned()
            .collect())
    }

    async fn soft_delete(&self, entity: Entity, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let stamp = |deleted_at: &mut Option<chrono::DateTime<Utc>>, updated_at: &mut chrono::DateTime<Utc>| {
            if deleted_at.is_some() {
                return false;
            }
            *deleted_at = Some(now);
            *updated_at = now;
            true
        };

        let deleted = match entity {
            Entity::User => tables
                .users
                .iter_mut()
                .find(|r| r.id == id)
                .map(|r| stamp(&mut r.deleted_at, &mut r.updated_at)),
            Entity::Application => tables
                .applications
                .iter_mut()
                .find(|r| r.id == id)
                .map(|r| stamp(&mut r.deleted_at, &mut r.updated_at)),
            Entity::Query => tables
                .queries
                .iter_mut()
                .find(|r| r.id == id)
                .map(|r| stamp(&mut r.deleted_at, &mut r.updated_at)),
            Entity::Document => tables
                .documents
                .iter_mut()
                .find(|r| r.id == id)
                .map(|r| stamp(&mut r.deleted_at, &mut r.updated_at)),
        };
        Ok(deleted.unwrap_or(false))
    }
}
