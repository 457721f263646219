mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn test_health_reports_database_ok() -> Result<()> {
    let app = TestApp::new()?;

    let res = app.get("/health", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["database"], "ok");
    assert_eq!(res.body["message"], "Bharat Seva Space API is running");

    let banner = app.get("/", None).await?;
    assert_eq!(banner.status, StatusCode::OK);
    assert_eq!(banner.body["name"], "Bharat Seva Space API");
    Ok(())
}

#[tokio::test]
async fn test_register_returns_user_and_token() -> Result<()> {
    let app = TestApp::new()?;

    let res = app
        .post(
            "/api/auth/register",
            None,
            json!({"email": "asha@example.com", "phone": "9000000001", "name": "Asha", "password": "secret123"}),
        )
        .await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["message"], "User registered successfully");
    assert_eq!(res.body["user"]["email"], "asha@example.com");
    assert_eq!(res.body["user"]["role"], "user");
    assert_eq!(res.body["user"]["is_active"], true);
    assert!(res.body["user"].get("password_hash").is_none());
    assert!(res.body["token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}

#[tokio::test]
async fn test_register_rejects_duplicate_email_or_phone() -> Result<()> {
    let app = TestApp::new()?;
    app.register("asha@example.com", "9000000001").await?;

    let same_email = app
        .post(
            "/api/auth/register",
            None,
            json!({"email": "asha@example.com", "phone": "9000000002", "name": "B", "password": "secret123"}),
        )
        .await?;
    assert_eq!(same_email.status, StatusCode::CONFLICT);
    assert_eq!(same_email.body["success"], false);
    assert_eq!(same_email.body["code"], "CONFLICT");

    let same_phone = app
        .post(
            "/api/auth/register",
            None,
            json!({"email": "other@example.com", "phone": "9000000001", "name": "C", "password": "secret123"}),
        )
        .await?;
    assert_eq!(same_phone.status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn test_register_validates_payload() -> Result<()> {
    let app = TestApp::new()?;

    let short_password = app
        .post(
            "/api/auth/register",
            None,
            json!({"email": "a@example.com", "phone": "1", "name": "A", "password": "123"}),
        )
        .await?;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(short_password.body["code"], "VALIDATION_ERROR");

    let bad_email = app
        .post(
            "/api/auth/register",
            None,
            json!({"email": "not-an-email", "phone": "1", "name": "A", "password": "secret123"}),
        )
        .await?;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let missing_field = app
        .post("/api/auth/register", None, json!({"email": "a@example.com"}))
        .await?;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_login_success_and_bad_credentials() -> Result<()> {
    let app = TestApp::new()?;
    app.register("asha@example.com", "9000000001").await?;

    let ok = app
        .post("/api/auth/login", None, json!({"email": "asha@example.com", "password": "secret123"}))
        .await?;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["message"], "Login successful");
    let token = ok.body["token"].as_str().unwrap_or_default().to_string();

    let profile = app.get("/api/user/profile", Some(&token)).await?;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["user"]["email"], "asha@example.com");

    let wrong_password = app
        .post("/api/auth/login", None, json!({"email": "asha@example.com", "password": "wrong-pass"}))
        .await?;
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["error"], "Invalid credentials");

    let unknown = app
        .post("/api/auth/login", None, json!({"email": "nobody@example.com", "password": "secret123"}))
        .await?;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body["error"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn test_deactivated_user_cannot_login() -> Result<()> {
    let app = TestApp::new()?;
    let (user_id, _) = app.register("asha@example.com", "9000000001").await?;
    let (_, admin) = app.admin("admin@example.com", "9999999999").await?;

    let res = app
        .put(&format!("/api/admin/users/{}", user_id), Some(&admin), json!({"is_active": false}))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["is_active"], false);

    let login = app
        .post("/api/auth/login", None, json!({"email": "asha@example.com", "password": "secret123"}))
        .await?;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
    assert_eq!(login.body["error"], "Account is deactivated");
    Ok(())
}

#[tokio::test]
async fn test_protected_routes_require_valid_token() -> Result<()> {
    let app = TestApp::new()?;

    let missing = app.get("/api/user/profile", None).await?;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["code"], "UNAUTHORIZED");

    let garbage = app.get("/api/user/dashboard", Some("not-a-jwt")).await?;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let foreign = seva_space_api::auth::TokenService::new("some-other-secret", std::time::Duration::from_secs(60))?;
    let (user_id, _) = app.register("asha@example.com", "9000000001").await?;
    let user = app.store_user(user_id).await?;
    let forged = foreign.issue(&user)?;
    let res = app.get("/api/user/profile", Some(&forged)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_profile_update_ignores_blank_fields() -> Result<()> {
    let app = TestApp::new()?;
    let (_, token) = app.register("asha@example.com", "9000000001").await?;

    let res = app
        .put("/api/user/profile", Some(&token), json!({"name": "Asha Rao", "phone": ""}))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Profile updated successfully");
    assert_eq!(res.body["user"]["name"], "Asha Rao");
    assert_eq!(res.body["user"]["phone"], "9000000001");
    Ok(())
}
