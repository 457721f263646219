// handlers/public/health.rs - GET /, GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "name": "Bharat Seva Space API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "public": "/health, /api/queries, /api/auth/register, /api/auth/login",
            "user": "/api/user/* (bearer token)",
            "admin": "/api/admin/* (bearer token, admin role)",
        }
    }))
}

/// GET /health - liveness plus a store probe
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "message": "Bharat Seva Space API is running",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "message": "Database unavailable",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
