//! Integration tests for the Token Service
//!
//! This is the top-level integration test harness that Cargo discovers.
//! Test modules are organized in the integration/ subdirectory.

#[path = "integration/token_tests.rs"]
mod token_tests;

#[path = "integration/health_tests.rs"]
mod health_tests;
