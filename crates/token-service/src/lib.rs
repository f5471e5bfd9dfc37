//! Token Service Library
//!
//! Mints short-lived RTC credentials for joining a communication channel.
//! The service is stateless: every request is validated, signed with the
//! configured app certificate, and answered without persistence.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/token_service.rs -> services/access_token.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `models` - Response models
//! - `observability` - Metrics
//! - `routes` - Axum router setup
//! - `services` - Token format and issuance

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
