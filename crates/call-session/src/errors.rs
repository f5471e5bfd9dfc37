//! Call session error types.
//!
//! Capability implementations (transport, devices, credential provider)
//! report failures as `SessionError`. The controller catches every error
//! raised during a join and turns it into a user notification; only
//! transport teardown errors from `leave` reach the caller.

use thiserror::Error;

/// Call session error type.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The credential request could not be completed.
    #[error("Credential request failed: {0}")]
    Credential(String),

    /// The credential response lacked a token or application identifier.
    #[error("Token or App ID missing")]
    MissingCredential,

    /// The RTC transport rejected an operation.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local media capture or playback failed.
    #[error("Media error: {0}")]
    Media(String),
}
