//! User-visible notifications.

/// Shows a blocking message to the user (an alert dialog in a browser,
/// a modal in a native shell).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Message shown when the credential response lacks a token or app ID.
pub const CREDENTIAL_MISSING_MESSAGE: &str = "Token or App ID missing";

/// Message shown when any step of the join sequence fails.
pub const JOIN_FAILED_MESSAGE: &str = "Join failed! Check console/env vars.";
