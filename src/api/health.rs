use axum::{Json, extract::State, http::StatusCode};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "API banner")
    )
)]
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Library Management API" }))
}

#[utoipa::path(
    get,
    path = "/ping",
    responses(
        (status = 200, description = "Service is running")
    )
)]
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "Library API running" }))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are healthy"),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn health_check(State(db): State<DatabaseConnection>) -> (StatusCode, Json<Value>) {
    let (status, database) = match db.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!("Database ping failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "database": database,
            "service": "bibliolend",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
