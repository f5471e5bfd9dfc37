//! Mock credential provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use session_test_utils::MockCredentialProvider;
//!
//! let provider = MockCredentialProvider::missing_token();
//! // Joining with this provider notifies "Token or App ID missing".
//! ```

use call_session::{CredentialProvider, FetchedCredential, SessionError};
use common::secret::SecretString;
use common::types::{ChannelName, ParticipantId};
use std::sync::Mutex;

/// App ID returned by [`MockCredentialProvider::valid`].
pub const MOCK_APP_ID: &str = "mock-app-id";

/// Token returned by [`MockCredentialProvider::valid`].
pub const MOCK_TOKEN: &str = "006mock-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Response {
    Valid,
    MissingToken,
    MissingAppId,
    Error,
}

/// Credential provider with a canned response.
#[derive(Debug)]
pub struct MockCredentialProvider {
    response: Response,
    requests: Mutex<Vec<(ChannelName, ParticipantId)>>,
}

impl MockCredentialProvider {
    fn with_response(response: Response) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Return a complete credential.
    pub fn valid() -> Self {
        Self::with_response(Response::Valid)
    }

    /// Return a credential without a token.
    pub fn missing_token() -> Self {
        Self::with_response(Response::MissingToken)
    }

    /// Return a credential without an app ID.
    pub fn missing_app_id() -> Self {
        Self::with_response(Response::MissingAppId)
    }

    /// Fail every request.
    pub fn failing() -> Self {
        Self::with_response(Response::Error)
    }

    /// Every (channel, uid) requested so far.
    pub fn requests(&self) -> Vec<(ChannelName, ParticipantId)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl CredentialProvider for MockCredentialProvider {
    async fn fetch(
        &self,
        channel: &ChannelName,
        uid: ParticipantId,
    ) -> Result<FetchedCredential, SessionError> {
        self.requests.lock().unwrap().push((channel.clone(), uid));

        let token = || Some(SecretString::from(MOCK_TOKEN));
        let app_id = || Some(MOCK_APP_ID.to_string());

        match self.response {
            Response::Valid => Ok(FetchedCredential {
                token: token(),
                app_id: app_id(),
            }),
            Response::MissingToken => Ok(FetchedCredential {
                token: None,
                app_id: app_id(),
            }),
            Response::MissingAppId => Ok(FetchedCredential {
                token: token(),
                app_id: None,
            }),
            Response::Error => Err(SessionError::Credential(
                "Mock credential provider error".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_requests() {
        let provider = MockCredentialProvider::valid();
        let credential = provider
            .fetch(&ChannelName::global(), ParticipantId(12))
            .await
            .unwrap();

        assert!(credential.token.is_some());
        assert_eq!(credential.app_id.as_deref(), Some(MOCK_APP_ID));
        assert_eq!(
            provider.requests(),
            vec![(ChannelName::global(), ParticipantId(12))]
        );
    }

    #[tokio::test]
    async fn test_canned_failures() {
        let uid = ParticipantId(1);
        let channel = ChannelName::global();

        let missing = MockCredentialProvider::missing_token()
            .fetch(&channel, uid)
            .await
            .unwrap();
        assert!(missing.token.is_none());

        let missing = MockCredentialProvider::missing_app_id()
            .fetch(&channel, uid)
            .await
            .unwrap();
        assert!(missing.app_id.is_none());

        let failing = MockCredentialProvider::failing().fetch(&channel, uid).await;
        assert!(matches!(failing, Err(SessionError::Credential(_))));
    }
}
