//! Fixed-shape status-bucket counts. Each bucket is its own count query so a
//! bucket filter can never leak into the next one.

use serde::Serialize;

use crate::database::models::{ApplicationFilter, QueryFilter, UserFilter};
use crate::database::{DatabaseError, Scope, Store};
use crate::types::{ApplicationStatus, QueryStatus, Role};

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ApplicationStats {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct QueryStats {
    pub total: i64,
    pub new: i64,
    pub contacted: i64,
    pub converted: i64,
    pub closed: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub inactive_users: i64,
    pub admin_users: i64,
    pub regular_users: i64,
}

pub async fn application_stats(store: &dyn Store, scope: Scope) -> Result<ApplicationStats, DatabaseError> {
    let count = |status: ApplicationStatus| async move {
        store
            .count_applications(scope, &ApplicationFilter::status(status))
            .await
    };

    Ok(ApplicationStats {
        total: store.count_applications(scope, &ApplicationFilter::default()).await?,
        pending: count(ApplicationStatus::Pending).await?,
        in_progress: count(ApplicationStatus::InProgress).await?,
        completed: count(ApplicationStatus::Completed).await?,
        cancelled: count(ApplicationStatus::Cancelled).await?,
    })
}

pub async fn query_stats(store: &dyn Store) -> Result<QueryStats, DatabaseError> {
    let count = |status: Option<QueryStatus>| async move { store.count_queries(&QueryFilter { status }).await };

    Ok(QueryStats {
        total: count(None).await?,
        new: count(Some(QueryStatus::New)).await?,
        contacted: count(Some(QueryStatus::Contacted)).await?,
        converted: count(Some(QueryStatus::Converted)).await?,
        closed: count(Some(QueryStatus::Closed)).await?,
    })
}

pub async fn user_stats(store: &dyn Store) -> Result<UserStats, DatabaseError> {
    let count = |role: Option<Role>, is_active: Option<bool>| async move {
        store.count_users(&UserFilter { role, is_active }).await
    };

    Ok(UserStats {
        total_users: count(None, None).await?,
        active_users: count(None, Some(true)).await?,
        inactive_users: count(None, Some(false)).await?,
        admin_users: count(Some(Role::Admin), None).await?,
        regular_users: count(Some(Role::User), None).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ApplicationPatch, NewApplication, NewUser};
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn buckets_are_independent_and_scoped() {
        let store = MemoryStore::new();
        let mut owners = Vec::new();
        for (i, email) in ["a@x.com", "b@x.com"].iter().enumerate() {
            let user = store
                .insert_user(NewUser {
                    email: email.to_string(),
                    phone: i.to_string(),
                    name: "n".into(),
                    password_hash: "x".into(),
                    role: Role::User,
                    is_active: true,
                })
                .await
                .unwrap();
            owners.push(user.id);
        }

        for owner in [owners[0], owners[0], owners[1]] {
            store
                .insert_application(NewApplication {
                    user_id: owner,
                    service_type: "gst".into(),
                    description: String::new(),
                    amount: 0.0,
                })
                .await
                .unwrap();
        }
        let (apps, _) = store
            .list_applications(Scope::Owner(owners[0]), &ApplicationFilter::default(), crate::database::Page::new(1, 10))
            .await
            .unwrap();
        store
            .update_application(
                apps[0].id,
                &ApplicationPatch { status: Some(ApplicationStatus::Completed), ..Default::default() },
            )
            .await
            .unwrap();

        let mine = application_stats(&store, Scope::Owner(owners[0])).await.unwrap();
        assert_eq!(
            mine,
            ApplicationStats { total: 2, pending: 1, in_progress: 0, completed: 1, cancelled: 0 }
        );

        let all = application_stats(&store, Scope::All).await.unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.pending, 2);
    }

    #[tokio::test]
    async fn empty_store_reports_zeroes() {
        let store = MemoryStore::new();
        assert_eq!(query_stats(&store).await.unwrap(), QueryStats::default());
        assert_eq!(user_stats(&store).await.unwrap(), UserStats::default());
    }
}
