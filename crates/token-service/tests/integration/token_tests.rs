//! Integration tests for `GET /api/agora-token`
//!
//! Each test spawns a real server on a random port and talks to it over HTTP.

use base64::{engine::general_purpose::STANDARD, Engine};
use common::types::{CredentialResponse, ErrorResponse};
use reqwest::StatusCode;
use token_test_utils::{TestTokenServer, TEST_APP_ID};

async fn get_token(server: &TestTokenServer, query: &str) -> Result<reqwest::Response, anyhow::Error> {
    let response = reqwest::Client::new()
        .get(format!("{}/api/agora-token{}", server.url(), query))
        .send()
        .await?;
    Ok(response)
}

// ============================================================================
// Success
// ============================================================================

#[tokio::test]
async fn test_issues_token_for_valid_request() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = get_token(&server, "?channelName=global-room&uid=42").await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: CredentialResponse = response.json().await?;
    assert_eq!(body.app_id, TEST_APP_ID);
    assert!(body.token.starts_with(&format!("006{}", TEST_APP_ID)));

    let content = body.token.trim_start_matches("006").trim_start_matches(TEST_APP_ID);
    assert!(
        STANDARD.decode(content).is_ok(),
        "token body should be standard base64"
    );

    Ok(())
}

#[tokio::test]
async fn test_uid_zero_is_accepted() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = get_token(&server, "?channelName=test&uid=0").await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: CredentialResponse = response.json().await?;
    assert!(!body.token.is_empty());
    assert_eq!(body.app_id, TEST_APP_ID);

    Ok(())
}

#[tokio::test]
async fn test_consecutive_tokens_differ() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let first: CredentialResponse = get_token(&server, "?channelName=test&uid=7")
        .await?
        .json()
        .await?;
    let second: CredentialResponse = get_token(&server, "?channelName=test&uid=7")
        .await?
        .json()
        .await?;

    // Fresh random salt per issuance.
    assert_ne!(first.token, second.token);

    Ok(())
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_missing_channel_returns_400() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = get_token(&server, "?uid=5").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await?;
    assert_eq!(body.error, "Channel name required");

    Ok(())
}

#[tokio::test]
async fn test_empty_channel_returns_400() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = get_token(&server, "?channelName=&uid=5").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await?;
    assert_eq!(body.error, "Channel name required");

    Ok(())
}

#[tokio::test]
async fn test_missing_uid_returns_400() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = get_token(&server, "?channelName=test").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await?;
    assert_eq!(body.error, "UID required");

    Ok(())
}

#[tokio::test]
async fn test_non_numeric_uid_returns_400() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    for uid in ["abc", "-1", "4294967296"] {
        let response = get_token(&server, &format!("?channelName=test&uid={}", uid)).await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uid={}", uid);
        let body: ErrorResponse = response.json().await?;
        assert_eq!(body.error, "UID required");
    }

    Ok(())
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_missing_credentials_returns_500() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn_unconfigured().await?;

    let response = get_token(&server, "?channelName=test&uid=1").await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = response.json().await?;
    assert_eq!(body.error, "Missing Agora App ID / Certificate");

    Ok(())
}

#[tokio::test]
async fn test_validation_checked_before_credentials() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn_unconfigured().await?;

    let response = get_token(&server, "?uid=1").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await?;
    assert_eq!(body.error, "Channel name required");

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_returns_404() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/unknown", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
