//! Token Service configuration.
//!
//! Configuration is loaded from environment variables. The signing
//! credentials are optional at load time: a missing app ID or certificate
//! is reported per request as a configuration error, so the process can
//! start (and answer health checks) before they are provisioned.

use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Default graceful shutdown drain period in seconds.
pub const DEFAULT_DRAIN_SECONDS: u64 = 0;

/// Environment variable holding the (public) application identifier.
pub const APP_ID_VAR: &str = "AGORA_APP_ID";

/// Environment variable holding the (secret) application certificate.
pub const APP_CERTIFICATE_VAR: &str = "AGORA_APP_CERTIFICATE";

/// Token Service configuration.
///
/// The app certificate is redacted in Debug output.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:3000").
    pub bind_address: String,

    /// Application identifier. `None` when unset or empty.
    pub app_id: Option<String>,

    /// Application certificate used as the HMAC key. `None` when unset or empty.
    pub app_certificate: Option<SecretString>,

    /// Seconds to keep serving in-flight requests after a shutdown signal.
    pub drain_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("app_id", &self.app_id)
            .field(
                "app_certificate",
                &self.app_certificate.as_ref().map(|_| "[REDACTED]"),
            )
            .field("drain_seconds", &self.drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid drain period: {0}")]
    InvalidDrainSeconds(String),
}

/// Signing credentials borrowed from a fully configured [`Config`].
pub struct SigningCredentials<'a> {
    pub app_id: &'a str,
    pub app_certificate: &'a str,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let app_id = non_empty(vars, APP_ID_VAR);
        let app_certificate = non_empty(vars, APP_CERTIFICATE_VAR).map(SecretString::from);

        let drain_seconds = match vars.get("TOKEN_SERVICE_DRAIN_SECONDS") {
            Some(value_str) => value_str.parse().map_err(|e| {
                ConfigError::InvalidDrainSeconds(format!(
                    "TOKEN_SERVICE_DRAIN_SECONDS must be a non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?,
            None => DEFAULT_DRAIN_SECONDS,
        };

        Ok(Config {
            bind_address,
            app_id,
            app_certificate,
            drain_seconds,
        })
    }

    /// Returns the signing credentials, or the name of the first missing variable.
    pub fn signing_credentials(&self) -> Result<SigningCredentials<'_>, &'static str> {
        let app_id = self.app_id.as_deref().ok_or(APP_ID_VAR)?;
        let app_certificate = self
            .app_certificate
            .as_ref()
            .map(|c| c.expose_secret())
            .ok_or(APP_CERTIFICATE_VAR)?;

        Ok(SigningCredentials {
            app_id,
            app_certificate,
        })
    }

    /// Whether both signing credentials are present.
    pub fn has_signing_credentials(&self) -> bool {
        self.signing_credentials().is_ok()
    }
}

fn non_empty(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key).filter(|v| !v.is_empty()).cloned()
}
