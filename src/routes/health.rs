use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database) = match state.document_repo.ping().await {
        Ok(()) => ("ok", "ok"),
        Err(e) => {
            tracing::warn!("Health check: database unreachable: {e:#}");
            ("degraded", "unreachable")
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
