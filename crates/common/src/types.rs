//! Common data types shared by the token service and the call session.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The single channel every participant of a deployment joins.
pub const GLOBAL_CHANNEL: &str = "global-room";

/// Path of the credential endpoint served by the token service.
pub const TOKEN_ENDPOINT_PATH: &str = "/api/agora-token";

/// How long an issued credential stays valid, in seconds.
pub const CREDENTIAL_VALIDITY_SECONDS: u32 = 3600;

/// Numeric participant identifier used by the RTC transport.
///
/// Zero is a valid identifier. It is never a sentinel for "missing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    /// Returns the raw integer value.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ParticipantId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Error returned when a channel name is empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("channel name must not be empty")]
pub struct EmptyChannelName;

/// Name of an RTC channel. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName(String);

impl ChannelName {
    /// Creates a channel name, rejecting the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyChannelName`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, EmptyChannelName> {
        let name = name.into();
        if name.is_empty() {
            return Err(EmptyChannelName);
        }
        Ok(Self(name))
    }

    /// The deployment-wide channel ([`GLOBAL_CHANNEL`]).
    #[must_use]
    pub fn global() -> Self {
        Self(GLOBAL_CHANNEL.to_string())
    }

    /// Returns the channel name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ChannelName {
    type Error = EmptyChannelName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelName> for String {
    fn from(value: ChannelName) -> Self {
        value.0
    }
}

/// Successful response body of the credential endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialResponse {
    /// Signed, time-limited RTC token.
    pub token: String,

    /// Application identifier the token was issued for.
    #[serde(rename = "appId")]
    pub app_id: String,
}

/// Error response body of the credential endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Generic, client-safe error message.
    pub error: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_name_rejects_empty() {
        assert_eq!(ChannelName::new(""), Err(EmptyChannelName));
        assert_eq!(ChannelName::new("test").unwrap().as_str(), "test");
    }

    #[test]
    fn test_global_channel() {
        assert_eq!(ChannelName::global().as_str(), "global-room");
    }

    #[test]
    fn test_channel_name_deserialize_rejects_empty() {
        let result: Result<ChannelName, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_participant_id_zero_is_a_value() {
        let id: ParticipantId = serde_json::from_str("0").unwrap();
        assert_eq!(id, ParticipantId(0));
        assert_eq!(id.to_string(), "0");
    }

    #[test]
    fn test_credential_response_uses_app_id_camel_case() {
        let response = CredentialResponse {
            token: "006abc".to_string(),
            app_id: "app".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token"], "006abc");
        assert_eq!(json["appId"], "app");
        assert!(json.get("app_id").is_none());
    }
}
