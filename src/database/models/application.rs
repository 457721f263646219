use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{ApplicationStatus, PaymentStatus};

/// A service request submitted by a registered user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub service_type: String,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub progress: String,
    #[sqlx(try_from = "String")]
    pub payment_status: PaymentStatus,
    pub amount: f64,
    pub description: String,
    pub assigned_ca: Option<i64>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

pub const DEFAULT_PROGRESS: &str = "0%";

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub user_id: i64,
    pub service_type: String,
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
    pub status: Option<ApplicationStatus>,
    pub progress: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub assigned_ca: Option<i64>,
    pub notes: Option<String>,
    pub amount: Option<f64>,
}

impl ApplicationPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.progress.is_none()
            && self.payment_status.is_none()
            && self.assigned_ca.is_none()
            && self.notes.is_none()
            && self.amount.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub service_type: Option<String>,
}

impl ApplicationFilter {
    pub fn status(status: ApplicationStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}
