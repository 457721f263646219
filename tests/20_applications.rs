mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::TestApp;

fn service_types(body: &Value) -> Vec<String> {
    body["applications"]
        .as_array()
        .map(|apps| {
            apps.iter()
                .filter_map(|a| a["service_type"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_register_create_list_flow() -> Result<()> {
    let app = TestApp::new()?;
    let (user_id, token) = app.register("asha@example.com", "9000000001").await?;

    let created = app
        .post(
            "/api/user/applications",
            Some(&token),
            json!({"service_type": "tax-filing", "description": "FY 2025 return", "amount": 1500.0}),
        )
        .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["message"], "Application created successfully");
    let id = created.body["application_id"].as_i64().unwrap_or_default();
    assert!(id > 0);

    let list = app.get("/api/user/applications", Some(&token)).await?;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["pagination"], json!({"page": 1, "limit": 10, "total": 1}));

    let row = &list.body["applications"][0];
    assert_eq!(row["id"], id);
    assert_eq!(row["user_id"], user_id);
    assert_eq!(row["service_type"], "tax-filing");
    assert_eq!(row["status"], "pending");
    assert_eq!(row["payment_status"], "pending");
    assert_eq!(row["progress"], "0%");
    assert_eq!(row["amount"], 1500.0);

    let detail = app.get(&format!("/api/user/applications/{}", id), Some(&token)).await?;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["application"]["user"]["email"], "asha@example.com");
    assert_eq!(detail.body["application"]["documents"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_create_application_validates_payload() -> Result<()> {
    let app = TestApp::new()?;
    let (_, token) = app.register("asha@example.com", "9000000001").await?;

    let missing = app
        .post("/api/user/applications", Some(&token), json!({"description": "no type"}))
        .await?;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let negative = app
        .post(
            "/api/user/applications",
            Some(&token),
            json!({"service_type": "itr", "amount": -5.0}),
        )
        .await?;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
    assert_eq!(negative.body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn test_foreign_application_is_not_found() -> Result<()> {
    let app = TestApp::new()?;
    let (_, owner) = app.register("owner@example.com", "9000000001").await?;
    let (_, other) = app.register("other@example.com", "9000000002").await?;
    let id = app.create_application(&owner, "itr_filing").await?;

    let res = app.get(&format!("/api/user/applications/{}", id), Some(&other)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "Application not found");

    let docs = app
        .get(&format!("/api/user/applications/{}/documents", id), Some(&other))
        .await?;
    assert_eq!(docs.status, StatusCode::NOT_FOUND);

    let listed = app.get("/api/user/applications", Some(&other)).await?;
    assert_eq!(listed.body["pagination"]["total"], 0);

    // Admins see every application through the same route
    let (_, admin) = app.admin("admin@example.com", "9999999999").await?;
    let as_admin = app.get(&format!("/api/user/applications/{}", id), Some(&admin)).await?;
    assert_eq!(as_admin.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() -> Result<()> {
    let app = TestApp::new()?;
    let (_, token) = app.register("asha@example.com", "9000000001").await?;

    let res = app.get("/api/user/applications/abc", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_pagination_is_newest_first() -> Result<()> {
    let app = TestApp::new()?;
    let (_, token) = app.register("asha@example.com", "9000000001").await?;
    for i in 1..=12 {
        app.create_application(&token, &format!("svc-{}", i)).await?;
    }

    let res = app.get("/api/user/applications?page=2&limit=5", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["pagination"], json!({"page": 2, "limit": 5, "total": 12}));
    assert_eq!(service_types(&res.body), vec!["svc-7", "svc-6", "svc-5", "svc-4", "svc-3"]);

    let last = app.get("/api/user/applications?page=3&limit=5", Some(&token)).await?;
    assert_eq!(service_types(&last.body), vec!["svc-2", "svc-1"]);

    let past_end = app.get("/api/user/applications?page=9&limit=5", Some(&token)).await?;
    assert_eq!(past_end.body["applications"], json!([]));
    assert_eq!(past_end.body["pagination"]["total"], 12);
    Ok(())
}

#[tokio::test]
async fn test_list_filters_by_status_and_service_type() -> Result<()> {
    let app = TestApp::new()?;
    let (_, token) = app.register("asha@example.com", "9000000001").await?;
    let (_, admin) = app.admin("admin@example.com", "9999999999").await?;

    let gst = app.create_application(&token, "gst").await?;
    app.create_application(&token, "itr").await?;
    app.put(&format!("/api/admin/applications/{}", gst), Some(&admin), json!({"status": "completed"}))
        .await?;

    let completed = app.get("/api/user/applications?status=completed", Some(&token)).await?;
    assert_eq!(service_types(&completed.body), vec!["gst"]);

    let itr = app.get("/api/user/applications?service_type=itr", Some(&token)).await?;
    assert_eq!(service_types(&itr.body), vec!["itr"]);

    let unknown = app.get("/api/user/applications?status=archived", Some(&token)).await?;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_stats_are_scoped_to_caller() -> Result<()> {
    let app = TestApp::new()?;
    let (_, asha) = app.register("asha@example.com", "9000000001").await?;
    let (_, ravi) = app.register("ravi@example.com", "9000000002").await?;
    app.create_application(&asha, "gst").await?;
    app.create_application(&asha, "itr").await?;
    app.create_application(&ravi, "gst").await?;

    let mine = app.get("/api/user/applications/stats", Some(&asha)).await?;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(
        mine.body["stats"],
        json!({"total": 2, "pending": 2, "in_progress": 0, "completed": 0, "cancelled": 0})
    );

    let dashboard = app.get("/api/user/dashboard", Some(&ravi)).await?;
    assert_eq!(dashboard.body["application_stats"]["total"], 1);
    assert_eq!(dashboard.body["recent_applications"].as_array().map(Vec::len), Some(1));
    assert!(dashboard.body.get("admin_stats").is_none());
    Ok(())
}

#[tokio::test]
async fn test_document_upload_and_list() -> Result<()> {
    let app = TestApp::new()?;
    let (_, token) = app.register("asha@example.com", "9000000001").await?;
    let id = app.create_application(&token, "gst").await?;
    let uri = format!("/api/user/applications/{}/documents", id);

    let res = app.upload(&uri, &token, "pan card.pdf", b"%PDF-1.4 test").await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["message"], "Document uploaded successfully");
    assert_eq!(res.body["document"]["file_name"], "pan_card.pdf");
    assert_eq!(res.body["document"]["file_size"], 13);
    assert_eq!(res.body["document"]["file_type"], "application/pdf");
    assert_eq!(res.body["document"]["description"], "ID proof");

    let path = res.body["document"]["file_path"].as_str().unwrap_or_default();
    assert!(std::path::Path::new(path).starts_with(app.uploads.path()));
    assert_eq!(std::fs::read(path)?, b"%PDF-1.4 test");

    let list = app.get(&uri, Some(&token)).await?;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["documents"].as_array().map(Vec::len), Some(1));

    let detail = app.get(&format!("/api/user/applications/{}", id), Some(&token)).await?;
    assert_eq!(detail.body["application"]["documents"][0]["file_name"], "pan_card.pdf");
    Ok(())
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() -> Result<()> {
    let app = TestApp::with_max_file_size(16)?;
    let (_, token) = app.register("asha@example.com", "9000000001").await?;
    let id = app.create_application(&token, "gst").await?;
    let uri = format!("/api/user/applications/{}/documents", id);

    let res = app.upload(&uri, &token, "big.pdf", &[b'x'; 64]).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let list = app.get(&uri, Some(&token)).await?;
    assert_eq!(list.body["documents"], json!([]));
    Ok(())
}
