use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when either dependency check fails.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// The asset store root exists and is a directory.
    pub storage_healthy: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = catalog_db::health_check(&state.pool).await.is_ok();
    let storage_healthy = tokio::fs::metadata(&state.config.storage_root)
        .await
        .is_ok_and(|meta| meta.is_dir());

    if !db_healthy {
        tracing::warn!("Health check found the database unreachable");
    }
    if !storage_healthy {
        tracing::warn!(root = %state.config.storage_root.display(), "Storage root is missing");
    }

    Json(HealthResponse {
        status: if db_healthy && storage_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        storage_healthy,
    })
}

/// Mounted at the root, outside `/api`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
