use axum::Json;

use crate::dto::HealthResponse;

pub mod users;

/// Liveness check; does not touch the backend.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
