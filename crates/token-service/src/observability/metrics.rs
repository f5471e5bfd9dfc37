//! Metrics definitions for the Token Service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `token_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! Labels are bounded: `reason` is one of `validation`, `configuration`,
//! `internal`. Channel names and uids are never used as labels.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle used by `/metrics`.
///
/// # Errors
///
/// Returns an error if the recorder cannot be installed (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("token_signing".to_string()),
            &[0.0001, 0.0005, 0.001, 0.002, 0.005, 0.010, 0.050],
        )
        .map_err(|e| format!("Failed to set signing buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record a successfully issued credential.
///
/// Metric: `token_issued_total`
pub fn record_token_issued() {
    counter!("token_issued_total").increment(1);
}

/// Record a rejected credential request.
///
/// Metric: `token_requests_rejected_total`
/// Labels: `reason`
pub fn record_token_rejected(reason: &'static str) {
    counter!("token_requests_rejected_total", "reason" => reason).increment(1);
}

/// Record time spent signing one token.
///
/// Metric: `token_signing_duration_seconds`
pub fn record_token_signing(duration: Duration) {
    histogram!("token_signing_duration_seconds").record(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    // With no recorder installed these go to the global no-op recorder;
    // the calls must simply not panic.

    #[test]
    fn test_record_functions() {
        record_token_issued();
        record_token_rejected("validation");
        record_token_rejected("configuration");
        record_token_rejected("internal");
        record_token_signing(Duration::from_micros(250));
    }
}
