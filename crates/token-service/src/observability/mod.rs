//! Observability for the Token Service.
//!
//! Structured logging goes through `tracing`. Handlers are instrumented with
//! `skip_all` plus an explicit allow-list of fields; the app certificate and
//! issued tokens never appear in spans or events.

pub mod metrics;
