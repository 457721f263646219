// handlers/public/auth.rs - POST /api/auth/register, POST /api/auth/login

use axum::extract::State;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::api::UserResponse;
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::services::{AccountService, Registration};
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// POST /api/auth/register - create a `user` account and return a token for it
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<serde_json::Value> {
    let accounts = AccountService::new(state.store.clone());
    let user = accounts
        .register(
            Registration {
                email: req.email,
                phone: req.phone,
                name: req.name,
                password: req.password,
            },
            Role::User,
        )
        .await?;

    let token = state.tokens.issue(&user)?;

    Ok(ApiResponse::created(json!({
        "user": UserResponse::from(&user),
        "token": token,
    }))
    .with_message("User registered successfully"))
}

/// POST /api/auth/login - exchange email and password for a token
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<serde_json::Value> {
    let accounts = AccountService::new(state.store.clone());
    let (user, token) = accounts.login(&state.tokens, &req.email, &req.password).await?;

    Ok(ApiResponse::success(json!({
        "user": UserResponse::from(&user),
        "token": token,
    }))
    .with_message("Login successful"))
}
