use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, JwtError, PasswordError, TokenService};
use crate::config::AdminSeedConfig;
use crate::database::models::{NewUser, User, UserFilter, UserPatch};
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;
use crate::types::Role;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("User with this email or phone already exists")]
    AlreadyExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account is deactivated")]
    Deactivated,
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Password error: {0}")]
    Password(PasswordError),
    #[error("Token error: {0}")]
    Token(#[from] JwtError),
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::AlreadyExists => ApiError::conflict(err.to_string()),
            AccountError::InvalidCredentials | AccountError::Deactivated => {
                ApiError::unauthorized(err.to_string())
            }
            AccountError::NotFound(_) => ApiError::not_found("User not found"),
            AccountError::Database(e) => e.into(),
            AccountError::Password(e) => e.into(),
            AccountError::Token(e) => e.into(),
        }
    }
}

/// Fields accepted when creating an account
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub phone: String,
    pub name: String,
    pub password: String,
}

/// Registration, login and administrator provisioning over the credential store
pub struct AccountService {
    store: Arc<dyn Store>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates a user account; email and phone must both be unused by live users
    pub async fn register(&self, registration: Registration, role: Role) -> Result<User, AccountError> {
        if self
            .store
            .find_user_by_email_or_phone(&registration.email, &registration.phone)
            .await?
            .is_some()
        {
            return Err(AccountError::AlreadyExists);
        }

        let password_hash = hash_password(&registration.password).map_err(AccountError::Password)?;

        let user = self
            .store
            .insert_user(NewUser {
                email: registration.email,
                phone: registration.phone,
                name: registration.name,
                password_hash,
                role,
                is_active: true,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration
                DatabaseError::Conflict(_) => AccountError::AlreadyExists,
                other => AccountError::Database(other),
            })?;

        info!("Registered user {} ({})", user.id, user.role);
        Ok(user)
    }

    /// Checks credentials and issues a token.
    ///
    /// The password is verified before the active flag so a deactivated account is
    /// only reported to a caller who already knows its password.
    pub async fn login(&self, tokens: &TokenService, email: &str, password: &str) -> Result<(User, String), AccountError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        match verify_password(password, &user.password_hash) {
            Ok(()) => {}
            Err(PasswordError::VerificationFailed) => {
                tracing::debug!("Password mismatch for user {}", user.id);
                return Err(AccountError::InvalidCredentials);
            }
            Err(e) => return Err(AccountError::Password(e)),
        }

        if !user.is_active {
            warn!("Login attempt on deactivated user {}", user.id);
            return Err(AccountError::Deactivated);
        }

        let token = tokens.issue(&user)?;
        Ok((user, token))
    }

    /// Creates the configured administrator when no admin account exists yet.
    /// Returns the new admin, or `None` if one was already present.
    pub async fn ensure_admin(&self, seed: &AdminSeedConfig) -> Result<Option<User>, AccountError> {
        let admins = self
            .store
            .count_users(&UserFilter {
                role: Some(Role::Admin),
                is_active: None,
            })
            .await?;
        if admins > 0 {
            return Ok(None);
        }

        let admin = self.register(Self::seed_registration(seed), Role::Admin).await?;
        info!("Seeded administrator {}", admin.email);
        Ok(Some(admin))
    }

    /// Creates the configured administrator; with `force`, any user holding the same
    /// email is removed first (including soft-deleted rows)
    pub async fn create_admin(&self, seed: &AdminSeedConfig, force: bool) -> Result<User, AccountError> {
        if force {
            let removed = self.store.purge_user_by_email(&seed.email).await?;
            if removed > 0 {
                warn!("Removed {} existing user(s) with email {}", removed, seed.email);
            }
        }
        self.register(Self::seed_registration(seed), Role::Admin).await
    }

    /// Grants the admin role to an existing user
    pub async fn promote(&self, email: &str) -> Result<User, AccountError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AccountError::NotFound(email.to_string()))?;

        let patch = UserPatch {
            role: Some(Role::Admin),
            ..Default::default()
        };
        self.store
            .update_user(user.id, &patch)
            .await?
            .ok_or_else(|| AccountError::NotFound(email.to_string()))
    }

    fn seed_registration(seed: &AdminSeedConfig) -> Registration {
        Registration {
            email: seed.email.clone(),
            phone: seed.phone.clone(),
            name: seed.name.clone(),
            password: seed.password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use std::time::Duration;

    fn service() -> AccountService {
        AccountService::new(Arc::new(MemoryStore::new()))
    }

    fn registration(email: &str, phone: &str) -> Registration {
        Registration {
            email: email.into(),
            phone: phone.into(),
            name: "Asha".into(),
            password: "secret1".into(),
        }
    }

    fn seed() -> AdminSeedConfig {
        AdminSeedConfig {
            email: "admin@example.com".into(),
            phone: "9999999999".into(),
            name: "Admin".into(),
            password: "adminpass".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_phone_is_rejected() {
        let accounts = service();
        accounts.register(registration("a@x.com", "111"), Role::User).await.unwrap();
        let err = accounts
            .register(registration("b@x.com", "111"), Role::User)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::AlreadyExists));
    }

    #[tokio::test]
    async fn login_checks_password_before_active_flag() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());
        let tokens = TokenService::new("test-secret", Duration::from_secs(60)).unwrap();

        let user = accounts.register(registration("a@x.com", "111"), Role::User).await.unwrap();
        store
            .update_user(user.id, &UserPatch { is_active: Some(false), ..Default::default() })
            .await
            .unwrap();

        let wrong = accounts.login(&tokens, "a@x.com", "nope").await.unwrap_err();
        assert!(matches!(wrong, AccountError::InvalidCredentials));

        let right = accounts.login(&tokens, "a@x.com", "secret1").await.unwrap_err();
        assert!(matches!(right, AccountError::Deactivated));
    }

    #[tokio::test]
    async fn seeding_is_skipped_once_an_admin_exists() {
        let accounts = service();
        assert!(accounts.ensure_admin(&seed()).await.unwrap().is_some());
        assert!(accounts.ensure_admin(&seed()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn forced_create_replaces_existing_admin() {
        let accounts = service();
        let first = accounts.create_admin(&seed(), false).await.unwrap();
        assert!(matches!(
            accounts.create_admin(&seed(), false).await.unwrap_err(),
            AccountError::AlreadyExists
        ));
        let second = accounts.create_admin(&seed(), true).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(second.role, Role::Admin);
    }

    #[tokio::test]
    async fn promote_grants_admin_role() {
        let accounts = service();
        accounts.register(registration("a@x.com", "111"), Role::User).await.unwrap();
        let promoted = accounts.promote("a@x.com").await.unwrap();
        assert!(promoted.role.is_admin());
        assert!(matches!(
            accounts.promote("missing@x.com").await.unwrap_err(),
            AccountError::NotFound(_)
        ));
    }
}
