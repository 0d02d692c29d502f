use axum::{
    http::{StatusCode, Uri},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::debug;

use crate::state::AppState;

pub const API_NAME: &str = "User Profile API";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct NotFoundResponse {
    pub detail: &'static str,
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(root))
}

/// Liveness only; does not touch the database.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "API is running",
    })
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: API_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<NotFoundResponse>) {
    debug!(path = %uri.path(), "no route");
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse { detail: "Not Found" }),
    )
}
