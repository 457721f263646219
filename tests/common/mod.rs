#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use seva_space_api::auth::TokenService;
use seva_space_api::config::{PaginationConfig, UploadConfig};
use seva_space_api::database::models::User;
use seva_space_api::database::{MemoryStore, Store};
use seva_space_api::services::{AccountService, Registration};
use seva_space_api::types::Role;
use seva_space_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// The full router over an in-memory store, driven in-process
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<TokenService>,
    pub uploads: TempDir,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_max_file_size(1024 * 1024)
    }

    pub fn with_max_file_size(max_file_size: u64) -> Result<Self> {
        let uploads = tempfile::tempdir().context("failed to create upload dir")?;
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenService::new(TEST_SECRET, Duration::from_secs(3600))?;

        let state = AppState::new(
            store.clone() as Arc<dyn Store>,
            tokens,
            UploadConfig {
                upload_path: uploads.path().to_string_lossy().into_owned(),
                max_file_size,
            },
            PaginationConfig {
                default_limit: 10,
                max_limit: 100,
            },
        );
        let tokens = state.tokens.clone();

        Ok(Self {
            router: app(state),
            store,
            tokens,
            uploads,
        })
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body ({})", status))?
        };
        Ok(Response { status, body })
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<Response> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<Response> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<Response> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<Response> {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<Response> {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Registers through the API and returns (user id, token)
    pub async fn register(&self, email: &str, phone: &str) -> Result<(i64, String)> {
        let res = self
            .post(
                "/api/auth/register",
                None,
                json!({"email": email, "phone": phone, "name": "Test User", "password": "secret123"}),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "register failed: {} {}", res.status, res.body);

        let id = res.body["user"]["id"].as_i64().context("missing user id")?;
        let token = res.body["token"].as_str().context("missing token")?.to_string();
        Ok((id, token))
    }

    /// Creates an admin directly in the store and returns (user id, token)
    pub async fn admin(&self, email: &str, phone: &str) -> Result<(i64, String)> {
        let admin = AccountService::new(self.store.clone())
            .register(
                Registration {
                    email: email.into(),
                    phone: phone.into(),
                    name: "Admin".into(),
                    password: "adminpass".into(),
                },
                Role::Admin,
            )
            .await?;
        let token = self.tokens.issue(&admin)?;
        Ok((admin.id, token))
    }

    pub async fn store_user(&self, id: i64) -> Result<User> {
        self.store.find_user(id).await?.context("user not in store")
    }

    pub async fn create_application(&self, token: &str, service_type: &str) -> Result<i64> {
        let res = self
            .post("/api/user/applications", Some(token), json!({"service_type": service_type}))
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create failed: {} {}", res.status, res.body);
        res.body["application_id"].as_i64().context("missing application_id")
    }

    /// Multipart upload with a single `file` part and a `description` part
    pub async fn upload(&self, uri: &str, token: &str, file_name: &str, bytes: &[u8]) -> Result<Response> {
        let boundary = "seva-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nID proof\r\n\
                 --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
                 Content-Type: application/pdf\r\n\r\n",
                b = boundary,
                f = file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))?;
        self.send(request).await
    }
}
