//! Service layer for the Token Service.
//!
//! - `access_token` - RTC token format and signing
//! - `token_service` - Credential issuance (expiry, role, configuration checks)

pub mod access_token;
pub mod token_service;
