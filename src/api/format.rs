//! Wire shapes for domain rows. Password hashes and soft-delete markers never
//! leave the process; related rows are attached only when they were loaded.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::{Application, Document, Query, User};
use crate::types::{ApplicationStatus, PaymentStatus, QueryStatus, Role};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub phone: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            phone: user.phone.clone(),
            name: user.name.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentResponse {
    pub id: i64,
    pub application_id: i64,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for DocumentResponse {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id,
            application_id: document.application_id,
            file_name: document.file_name.clone(),
            file_path: document.file_path.clone(),
            file_size: document.file_size,
            file_type: document.file_type.clone(),
            description: document.description.clone(),
            uploaded_at: document.uploaded_at,
            created_at: document.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationResponse {
    pub id: i64,
    pub user_id: i64,
    pub service_type: String,
    pub status: ApplicationStatus,
    pub progress: String,
    pub payment_status: PaymentStatus,
    pub amount: f64,
    pub description: String,
    pub assigned_ca: Option<i64>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_ca_user: Option<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentResponse>>,
}

impl From<&Application> for ApplicationResponse {
    fn from(app: &Application) -> Self {
        Self {
            id: app.id,
            user_id: app.user_id,
            service_type: app.service_type.clone(),
            status: app.status,
            progress: app.progress.clone(),
            payment_status: app.payment_status,
            amount: app.amount,
            description: app.description.clone(),
            assigned_ca: app.assigned_ca,
            notes: app.notes.clone(),
            created_at: app.created_at,
            updated_at: app.updated_at,
            user: None,
            assigned_ca_user: None,
            documents: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
    pub status: QueryStatus,
    pub assigned_to: Option<i64>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user: Option<UserResponse>,
}

impl From<&Query> for QueryResponse {
    fn from(query: &Query) -> Self {
        Self {
            id: query.id,
            name: query.name.clone(),
            email: query.email.clone(),
            phone: query.phone.clone(),
            service: query.service.clone(),
            message: query.message.clone(),
            status: query.status,
            assigned_to: query.assigned_to,
            notes: query.notes.clone(),
            created_at: query.created_at,
            updated_at: query.updated_at,
            assigned_user: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::application::DEFAULT_PROGRESS;

    fn application() -> Application {
        let now = Utc::now();
        Application {
            id: 1,
            user_id: 2,
            service_type: "tax-filing".into(),
            status: ApplicationStatus::Pending,
            progress: DEFAULT_PROGRESS.into(),
            payment_status: PaymentStatus::Pending,
            amount: 0.0,
            description: String::new(),
            assigned_ca: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn unloaded_relations_are_omitted() {
        let value = serde_json::to_value(ApplicationResponse::from(&application())).unwrap();
        assert!(value.get("user").is_none());
        assert!(value.get("documents").is_none());
        assert_eq!(value["status"], "pending");
        assert_eq!(value["progress"], "0%");
    }

    #[test]
    fn user_response_has_no_password_hash() {
        let now = Utc::now();
        let user = User {
            id: 1,
            email: "a@x.com".into(),
            phone: "1".into(),
            name: "A".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::User,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let value = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["role"], "user");
    }
}
