//! Credential acquisition.
//!
//! `HttpCredentialClient` calls the Token Service over HTTP. The controller
//! only depends on the `CredentialProvider` trait, so tests and other
//! deployments can supply credentials another way.
//!
//! # Security
//!
//! - The issued token is wrapped in `SecretString` as soon as it is parsed
//! - Timeouts prevent a hung Token Service from stalling a join forever

use crate::errors::SessionError;
use common::secret::SecretString;
use common::types::{ChannelName, ErrorResponse, ParticipantId, TOKEN_ENDPOINT_PATH};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{error, instrument, warn};

/// Default timeout for credential requests in seconds.
const CREDENTIAL_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default connect timeout in seconds.
const CREDENTIAL_CONNECT_TIMEOUT_SECS: u64 = 5;

/// A credential as received. Either field may be absent; the controller
/// decides what an incomplete credential means.
#[derive(Default)]
pub struct FetchedCredential {
    pub token: Option<SecretString>,
    pub app_id: Option<String>,
}

impl fmt::Debug for FetchedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchedCredential")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("app_id", &self.app_id)
            .finish()
    }
}

/// Source of join credentials.
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Fetch a credential for `uid` in `channel`.
    async fn fetch(
        &self,
        channel: &ChannelName,
        uid: ParticipantId,
    ) -> Result<FetchedCredential, SessionError>;
}

/// Lenient view of the Token Service body: fields that are missing or
/// empty become `None`.
#[derive(Deserialize)]
struct RawCredentialBody {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "appId")]
    app_id: Option<String>,
}

/// HTTP client for the Token Service.
#[derive(Clone)]
pub struct HttpCredentialClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Base URL of the Token Service (e.g., "http://localhost:3000").
    base_url: String,
}

impl HttpCredentialClient {
    /// Create a new credential client.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Credential` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SessionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(CREDENTIAL_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CREDENTIAL_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                error!(target: "session.credentials", error = %e, "Failed to build HTTP client");
                SessionError::Credential("Failed to build HTTP client".to_string())
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Token endpoint URL.
    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, TOKEN_ENDPOINT_PATH)
    }

    /// Decode a response body.
    ///
    /// A rejection from the Token Service still carries a JSON body; it is
    /// read as a credential with nothing in it so the user is told the
    /// credential is missing. Only an unreadable body is an error.
    async fn handle_response(response: reqwest::Response) -> Result<FetchedCredential, SessionError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(target: "session.credentials", error = %e, "Failed to read Token Service response");
            SessionError::Credential("Token Service response unreadable".to_string())
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_default();
            warn!(
                target: "session.credentials",
                status = %status,
                error = %message,
                "Token Service rejected credential request"
            );
            return Ok(FetchedCredential::default());
        }

        let raw: RawCredentialBody = serde_json::from_str(&body).map_err(|e| {
            error!(target: "session.credentials", error = %e, "Failed to parse Token Service response");
            SessionError::Credential("Invalid Token Service response".to_string())
        })?;

        Ok(FetchedCredential {
            token: raw
                .token
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            app_id: raw.app_id.filter(|a| !a.is_empty()),
        })
    }
}

#[async_trait::async_trait]
impl CredentialProvider for HttpCredentialClient {
    #[instrument(skip(self), fields(channel = %channel, uid = %uid))]
    async fn fetch(
        &self,
        channel: &ChannelName,
        uid: ParticipantId,
    ) -> Result<FetchedCredential, SessionError> {
        let uid = uid.to_string();
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("channelName", channel.as_str()), ("uid", uid.as_str())])
            .send()
            .await
            .map_err(|e| {
                warn!(target: "session.credentials", error = %e, "Token Service request failed");
                SessionError::Credential("Token Service is unavailable".to_string())
            })?;

        Self::handle_response(response).await
    }
}
