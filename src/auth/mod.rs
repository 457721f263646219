pub mod password;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::database::models::User;
use crate::types::Role;

pub use password::{hash_password, verify_password, PasswordError};

/// Decoded payload of a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
}

impl Claims {
    pub fn new(user_id: i64, email: String, role: Role, expiry: Duration) -> Self {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(expiry.as_secs()).unwrap_or(i64::MAX);

        Self {
            user_id,
            email,
            role,
            exp: now.saturating_add(ttl),
            iat: now,
            nbf: now,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingToken,
    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,
    #[error("Invalid or expired token")]
    InvalidToken,
}

/// Issues and validates HS256 identity tokens under a single shared secret.
///
/// There is no revocation list: a token stays valid for its whole lifetime even if
/// the user is deactivated or deleted in the meantime.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, expiry: Duration) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry,
        })
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn issue(&self, user: &User) -> Result<String, JwtError> {
        let claims = Claims::new(user.id, user.email.clone(), user.role, self.expiry);
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })
    }
}
