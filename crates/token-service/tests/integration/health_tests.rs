//! Integration tests for the health and metrics endpoints

use reqwest::StatusCode;
use serde_json::Value;
use token_test_utils::TestTokenServer;

#[tokio::test]
async fn test_health_reports_configured_credentials() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["credentials"], "configured");

    Ok(())
}

/// Missing credentials must not fail the liveness probe.
#[tokio::test]
async fn test_health_reports_missing_credentials() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn_unconfigured().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["credentials"], "missing");
    assert!(!server.config().has_signing_credentials());

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_responds() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
