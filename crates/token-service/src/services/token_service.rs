use crate::config::Config;
use crate::errors::TokenServiceError;
use crate::observability::metrics;
use crate::services::access_token::{self, RtcRole};
use chrono::Utc;
use common::types::{ChannelName, ParticipantId, CREDENTIAL_VALIDITY_SECONDS};
use std::time::Instant;
use tracing::instrument;

/// A credential minted for one participant of one channel.
#[derive(Clone)]
pub struct IssuedCredential {
    pub token: String,
    pub app_id: String,
    /// Unix timestamp (seconds) at which the granted privileges expire.
    pub expires_at: u32,
}

impl std::fmt::Debug for IssuedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedCredential")
            .field("token", &"[REDACTED]")
            .field("app_id", &self.app_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Issue a publisher credential for `uid` in `channel`, valid for one hour from now.
pub fn issue_credential(
    config: &Config,
    channel: &ChannelName,
    uid: ParticipantId,
) -> Result<IssuedCredential, TokenServiceError> {
    let now = u32::try_from(Utc::now().timestamp()).map_err(|_| {
        TokenServiceError::Internal("system clock outside the u32 timestamp range".to_string())
    })?;
    issue_credential_at(config, channel, uid, now)
}

/// Issue a credential as of `now` (unix seconds).
#[instrument(skip_all, fields(channel = %channel, uid = %uid))]
pub fn issue_credential_at(
    config: &Config,
    channel: &ChannelName,
    uid: ParticipantId,
    now: u32,
) -> Result<IssuedCredential, TokenServiceError> {
    let credentials = config
        .signing_credentials()
        .map_err(TokenServiceError::Configuration)?;

    let expires_at = now.saturating_add(CREDENTIAL_VALIDITY_SECONDS);

    let started = Instant::now();
    let token = access_token::build_token_with_uid(
        credentials.app_id,
        credentials.app_certificate,
        channel,
        uid,
        RtcRole::Publisher,
        expires_at,
        now,
    )?;
    metrics::record_token_signing(started.elapsed());

    Ok(IssuedCredential {
        token,
        app_id: credentials.app_id.to_string(),
        expires_at,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{APP_CERTIFICATE_VAR, APP_ID_VAR};
    use std::collections::HashMap;

    fn configured() -> Config {
        Config::from_vars(&HashMap::from([
            (APP_ID_VAR.to_string(), "test-app-id".to_string()),
            (APP_CERTIFICATE_VAR.to_string(), "test-certificate".to_string()),
        ]))
        .unwrap()
    }

    #[test]
    fn test_expiry_is_one_hour_after_issuance() {
        let channel = ChannelName::new("test").unwrap();
        let issued = issue_credential_at(&configured(), &channel, ParticipantId(0), 1_000).unwrap();

        assert_eq!(issued.expires_at, 4_600);
        assert_eq!(issued.app_id, "test-app-id");
        assert!(issued.token.starts_with("006test-app-id"));
    }

    #[test]
    fn test_issue_credential_uses_wall_clock() {
        let channel = ChannelName::new("test").unwrap();
        let before = Utc::now().timestamp();
        let issued = issue_credential(&configured(), &channel, ParticipantId(5)).unwrap();
        let after = Utc::now().timestamp();

        let expires_at = i64::from(issued.expires_at);
        assert!(expires_at >= before + 3600);
        assert!(expires_at <= after + 3600);
    }

    #[test]
    fn test_missing_certificate_is_configuration_error() {
        let config = Config::from_vars(&HashMap::from([(
            APP_ID_VAR.to_string(),
            "test-app-id".to_string(),
        )]))
        .unwrap();
        let channel = ChannelName::new("test").unwrap();

        let result = issue_credential_at(&config, &channel, ParticipantId(1), 0);
        assert!(matches!(
            result,
            Err(TokenServiceError::Configuration(APP_CERTIFICATE_VAR))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let channel = ChannelName::new("test").unwrap();
        let issued = issue_credential_at(&configured(), &channel, ParticipantId(9), 0).unwrap();

        let debug = format!("{:?}", issued);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&issued.token));
    }
}
