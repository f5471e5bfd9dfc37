//! Health check handler.

use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /health
///
/// Always returns 200 so that a liveness probe does not restart a process
/// that is merely waiting for its signing credentials. The `credentials`
/// field tells operators whether token requests can currently succeed.
///
/// ```json
/// { "status": "healthy", "credentials": "configured" }
/// ```
#[instrument(skip_all, name = "token.health.check")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let credentials = if state.config.has_signing_credentials() {
        "configured"
    } else {
        "missing"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        credentials: credentials.to_string(),
    })
}
