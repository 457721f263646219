//! Batched loading of related rows for list and detail responses.
//!
//! One query per relation regardless of how many parent rows are being
//! serialized, instead of a lookup per row.

use std::collections::HashMap;

use crate::api::{ApplicationResponse, DocumentResponse, QueryResponse, UserResponse};
use crate::database::models::{Application, Query};
use crate::database::{DatabaseError, Store};

/// Which application relations to attach
#[derive(Debug, Clone, Copy, Default)]
pub struct Includes {
    pub owner: bool,
    pub assignee: bool,
    pub documents: bool,
}

impl Includes {
    pub const ALL: Includes = Includes {
        owner: true,
        assignee: true,
        documents: true,
    };

    /// Assignee and documents; the caller already knows the owner
    pub const OWN: Includes = Includes {
        owner: false,
        assignee: true,
        documents: true,
    };

    pub const ASSIGNEE: Includes = Includes {
        owner: false,
        assignee: true,
        documents: false,
    };
}

async fn users_by_id(store: &dyn Store, ids: Vec<i64>) -> Result<HashMap<i64, UserResponse>, DatabaseError> {
    let mut ids = ids;
    ids.sort_unstable();
    ids.dedup();

    Ok(store
        .find_users(&ids)
        .await?
        .iter()
        .map(|u| (u.id, UserResponse::from(u)))
        .collect())
}

pub async fn expand_applications(
    store: &dyn Store,
    applications: &[Application],
    includes: Includes,
) -> Result<Vec<ApplicationResponse>, DatabaseError> {
    let mut user_ids = Vec::new();
    if includes.owner {
        user_ids.extend(applications.iter().map(|a| a.user_id));
    }
    if includes.assignee {
        user_ids.extend(applications.iter().filter_map(|a| a.assigned_ca));
    }
    let users = if user_ids.is_empty() {
        HashMap::new()
    } else {
        users_by_id(store, user_ids).await?
    };

    let mut documents: HashMap<i64, Vec<DocumentResponse>> = HashMap::new();
    if includes.documents {
        let ids: Vec<i64> = applications.iter().map(|a| a.id).collect();
        for document in store.documents_for(&ids).await? {
            documents
                .entry(document.application_id)
                .or_default()
                .push(DocumentResponse::from(&document));
        }
    }

    Ok(applications
        .iter()
        .map(|app| {
            let mut response = ApplicationResponse::from(app);
            if includes.owner {
                response.user = users.get(&app.user_id).cloned();
            }
            if includes.assignee {
                response.assigned_ca_user = app.assigned_ca.and_then(|id| users.get(&id).cloned());
            }
            if includes.documents {
                response.documents = Some(documents.remove(&app.id).unwrap_or_default());
            }
            response
        })
        .collect())
}

pub async fn expand_application(
    store: &dyn Store,
    application: &Application,
    includes: Includes,
) -> Result<ApplicationResponse, DatabaseError> {
    let mut expanded = expand_applications(store, std::slice::from_ref(application), includes).await?;
    Ok(expanded
        .pop()
        .unwrap_or_else(|| ApplicationResponse::from(application)))
}

pub async fn expand_queries(store: &dyn Store, queries: &[Query]) -> Result<Vec<QueryResponse>, DatabaseError> {
    let ids: Vec<i64> = queries.iter().filter_map(|q| q.assigned_to).collect();
    let users = if ids.is_empty() {
        HashMap::new()
    } else {
        users_by_id(store, ids).await?
    };

    Ok(queries
        .iter()
        .map(|query| {
            let mut response = QueryResponse::from(query);
            response.assigned_user = query.assigned_to.and_then(|id| users.get(&id).cloned());
            response
        })
        .collect())
}

pub async fn expand_query(store: &dyn Store, query: &Query) -> Result<QueryResponse, DatabaseError> {
    let mut expanded = expand_queries(store, std::slice::from_ref(query)).await?;
    Ok(expanded.pop().unwrap_or_else(|| QueryResponse::from(query)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ApplicationPatch, NewApplication, NewDocument, NewUser};
    use crate::database::MemoryStore;
    use crate::types::Role;

    async fn user(store: &MemoryStore, email: &str, phone: &str, role: Role) -> i64 {
        store
            .insert_user(NewUser {
                email: email.into(),
                phone: phone.into(),
                name: email.into(),
                password_hash: "x".into(),
                role,
                is_active: true,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn attaches_owner_assignee_and_documents() {
        let store = MemoryStore::new();
        let owner = user(&store, "o@x.com", "1", Role::User).await;
        let ca = user(&store, "ca@x.com", "2", Role::Admin).await;

        let app = store
            .insert_application(NewApplication {
                user_id: owner,
                service_type: "gst".into(),
                description: String::new(),
                amount: 0.0,
            })
            .await
            .unwrap();
        let app = store
            .update_application(app.id, &ApplicationPatch { assigned_ca: Some(ca), ..Default::default() })
            .await
            .unwrap()
            .unwrap();
        store
            .insert_document(NewDocument {
                application_id: app.id,
                file_name: "pan.pdf".into(),
                file_path: "/tmp/pan.pdf".into(),
                file_size: 10,
                file_type: "application/pdf".into(),
                description: String::new(),
            })
            .await
            .unwrap();

        let expanded = expand_application(&store, &app, Includes::ALL).await.unwrap();
        assert_eq!(expanded.user.unwrap().id, owner);
        assert_eq!(expanded.assigned_ca_user.unwrap().id, ca);
        assert_eq!(expanded.documents.unwrap().len(), 1);

        let bare = expand_application(&store, &app, Includes::ASSIGNEE).await.unwrap();
        assert!(bare.user.is_none());
        assert!(bare.documents.is_none());
    }
}
