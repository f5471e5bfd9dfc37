//! HTTP routes for the Token Service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use axum::{routing::get, Router};
use common::types::TOKEN_ENDPOINT_PATH;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// - `/api/agora-token` - Credential issuance
/// - `/health` - Liveness probe
/// - `/metrics` - Prometheus metrics
/// - TraceLayer for request logging
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route(TOKEN_ENDPOINT_PATH, get(handlers::issue_token))
        .route("/health", get(handlers::health_check))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{APP_CERTIFICATE_VAR, APP_ID_VAR};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn app(vars: &[(&str, &str)]) -> Router {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let config = Config::from_vars(&vars).unwrap();
        let handle = PrometheusBuilder::new().build_recorder().handle();
        build_routes(Arc::new(AppState { config }), handle)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_validation_precedes_configuration() {
        // No credentials configured, but the missing channel is reported first
        let (status, body) = get(app(&[]), "/api/agora-token?uid=5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Channel name required");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_server_error() {
        let (status, body) = get(
            app(&[(APP_ID_VAR, "test-app-id")]),
            "/api/agora-token?channelName=test&uid=1",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Missing Agora App ID / Certificate");
    }

    #[tokio::test]
    async fn test_issues_token_for_uid_zero() {
        let (status, body) = get(
            app(&[(APP_ID_VAR, "test-app-id"), (APP_CERTIFICATE_VAR, "test-cert")]),
            "/api/agora-token?channelName=test&uid=0",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appId"], "test-app-id");
        assert!(body["token"].as_str().unwrap().starts_with("006test-app-id"));
    }

    #[tokio::test]
    async fn test_repeated_parameters_use_first_occurrence() {
        let configured = [(APP_ID_VAR, "test-app-id"), (APP_CERTIFICATE_VAR, "test-cert")];

        let (status, body) = get(
            app(&configured),
            "/api/agora-token?channelName=test&channelName=other&uid=1",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appId"], "test-app-id");

        let (status, body) = get(
            app(&configured),
            "/api/agora-token?channelName=test&uid=abc&uid=1",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "UID required");
    }

    #[tokio::test]
    async fn test_query_errors_are_json() {
        let response = app(&[])
            .oneshot(
                Request::builder()
                    .uri("/api/agora-token?channelName=test&channelName=other")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "UID required");
    }
}
