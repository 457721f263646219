use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{
    Application, ApplicationFilter, ApplicationPatch, Document, NewApplication, NewDocument,
    NewQuery, NewUser, Query, QueryFilter, QueryPatch, User, UserFilter, UserPatch,
};
use super::query_builder::{
    count_live, push_application_filter, push_page, push_query_filter, push_scope,
    push_user_filter, select_live, UpdateBuilder,
};
use super::store::{Entity, Page, Scope, Store};

/// [`Store`] backed by a Postgres pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, phone, name, password_hash, role, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_write)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND deleted_at IS NULL")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email_or_phone(&self, email: &str, phone: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE (email = $1 OR phone = $2) AND deleted_at IS NULL LIMIT 1",
        )
        .bind(email)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_users(&self, ids: &[i64]) -> Result<Vec<User>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1) AND deleted_at IS NULL")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_users(&self, filter: &UserFilter, page: Page) -> Result<(Vec<User>, i64), DatabaseError> {
        let total = self.count_users(filter).await?;

        let mut qb = select_live("users");
        push_user_filter(&mut qb, filter);
        push_page(&mut qb, page);
        let users = qb.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok((users, total))
    }

    async fn count_users(&self, filter: &UserFilter) -> Result<i64, DatabaseError> {
        let mut qb = count_live("users");
        push_user_filter(&mut qb, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, DatabaseError> {
        let mut update = UpdateBuilder::new("users");
        update
            .set_opt("name", patch.name.clone())
            .set_opt("phone", patch.phone.clone())
            .set_opt("role", patch.role.map(|r| r.as_str()))
            .set_opt("is_active", patch.is_active);

        update
            .finish(id)
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_write)
    }

    async fn purge_user_by_email(&self, email: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_application(&self, application: NewApplication) -> Result<Application, DatabaseError> {
        sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (user_id, service_type, description, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(application.user_id)
        .bind(&application.service_type)
        .bind(&application.description)
        .bind(application.amount)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_write)
    }

    async fn find_application(&self, scope: Scope, id: i64) -> Result<Option<Application>, DatabaseError> {
        let mut qb = select_live("applications");
        qb.push(" AND id = ").push_bind(id);
        push_scope(&mut qb, scope);
        let application = qb.build_query_as::<Application>().fetch_optional(&self.pool).await?;
        Ok(application)
    }

    async fn list_applications(
        &self,
        scope: Scope,
        filter: &ApplicationFilter,
        page: Page,
    ) -> Result<(Vec<Application>, i64), DatabaseError> {
        let total = self.count_applications(scope, filter).await?;

        let mut qb = select_live("applications");
        push_scope(&mut qb, scope);
        push_application_filter(&mut qb, filter);
        push_page(&mut qb, page);
        let applications = qb.build_query_as::<Application>().fetch_all(&self.pool).await?;

        Ok((applications, total))
    }

    async fn count_applications(&self, scope: Scope, filter: &ApplicationFilter) -> Result<i64, DatabaseError> {
        let mut qb = count_live("applications");
        push_scope(&mut qb, scope);
        push_application_filter(&mut qb, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn update_application(&self, id: i64, patch: &ApplicationPatch) -> Result<Option<Application>, DatabaseError> {
        let mut update = UpdateBuilder::new("applications");
        update
            .set_opt("status", patch.status.map(|s| s.as_str()))
            .set_opt("progress", patch.progress.clone())
            .set_opt("payment_status", patch.payment_status.map(|s| s.as_str()))
            .set_opt("assigned_ca", patch.assigned_ca)
            .set_opt("notes", patch.notes.clone())
            .set_opt("amount", patch.amount);

        update
            .finish(id)
            .build_query_as::<Application>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_write)
    }

    async fn insert_query(&self, query: NewQuery) -> Result<Query, DatabaseError> {
        sqlx::query_as::<_, Query>(
            r#"
            INSERT INTO queries (name, email, phone, service, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&query.name)
        .bind(&query.email)
        .bind(&query.phone)
        .bind(&query.service)
        .bind(&query.message)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_write)
    }

    async fn find_query(&self, id: i64) -> Result<Option<Query>, DatabaseError> {
        let query = sqlx::query_as::<_, Query>("SELECT * FROM queries WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(query)
    }

    async fn list_queries(&self, filter: &QueryFilter, page: Page) -> Result<(Vec<Query>, i64), DatabaseError> {
        let total = self.count_queries(filter).await?;

        let mut qb = select_live("queries");
        push_query_filter(&mut qb, filter);
        push_page(&mut qb, page);
        let queries = qb.build_query_as::<Query>().fetch_all(&self.pool).await?;

        Ok((queries, total))
    }

    async fn count_queries(&self, filter: &QueryFilter) -> Result<i64, DatabaseError> {
        let mut qb = count_live("queries");
        push_query_filter(&mut qb, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn update_query(&self, id: i64, patch: &QueryPatch) -> Result<Option<Query>, DatabaseError> {
        let mut update = UpdateBuilder::new("queries");
        update
            .set_opt("status", patch.status.map(|s| s.as_str()))
            .set_opt("assigned_to", patch.assigned_to)
            .set_opt("notes", patch.notes.clone());

        update
            .finish(id)
            .build_query_as::<Query>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_write)
    }

    async fn insert_document(&self, document: NewDocument) -> Result<Document, DatabaseError> {
        sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (application_id, file_name, file_path, file_size, file_type, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(document.application_id)
        .bind(&document.file_name)
        .bind(&document.file_path)
        .bind(document.file_size)
        .bind(&document.file_type)
        .bind(&document.description)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_write)
    }

    async fn documents_for(&self, application_ids: &[i64]) -> Result<Vec<Document>, DatabaseError> {
        if application_ids.is_empty() {
            return Ok(vec![]);
        }
        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE application_id = ANY($1) AND deleted_at IS NULL ORDER BY uploaded_at, id",
        )
        .bind(application_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(documents)
    }

    async fn soft_delete(&self, entity: Entity, id: i64) -> Result<bool, DatabaseError> {
        let sql = format!(
            "UPDATE {} SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
            entity.table()
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
