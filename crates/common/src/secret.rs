//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use them for the
//! app certificate on the server and for issued credentials on the client,
//! so that a derived `Debug` or a stray `tracing` field never prints them.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct SigningCredentials {
//!     app_id: String,
//!     app_certificate: SecretString,
//! }
//!
//! let creds = SigningCredentials {
//!     app_id: "970CA35de60c44645bbae8a215061b33".to_string(),
//!     app_certificate: SecretString::from("5CFd2fd1755d40ecb72977518be15d3b"),
//! };
//!
//! // Safe: the certificate is redacted
//! println!("{:?}", creds);
//!
//! // Signing code asks for the value explicitly
//! let certificate: &str = creds.app_certificate.expose_secret();
//! ```
//!
//! Secrets are zeroized when dropped.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("app-certificate");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("app-certificate"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("006abc");
        assert_eq!(secret.expose_secret(), "006abc");
    }

    #[test]
    fn test_deserialize_keeps_value_hidden() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct Issued {
            #[serde(rename = "appId")]
            app_id: String,
            token: SecretString,
        }

        let json = r#"{"appId": "app", "token": "006app-signed"}"#;
        let issued: Issued = serde_json::from_str(json).expect("deserialize");

        assert_eq!(issued.token.expose_secret(), "006app-signed");

        let debug = format!("{issued:?}");
        assert!(debug.contains("app"));
        assert!(!debug.contains("006app-signed"));
    }
}
