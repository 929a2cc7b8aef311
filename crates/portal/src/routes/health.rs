//! Health and readiness endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::state::AppState;

/// Liveness check. Always returns 200 while the process is up.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness check. Verifies the database is reachable.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::error!("Readiness check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
