//! Common utilities and types shared across Huddle components.

#![warn(clippy::pedantic)]

/// Module for common data types and wire models
pub mod types;

/// Module for secret types that prevent accidental logging
pub mod secret;
