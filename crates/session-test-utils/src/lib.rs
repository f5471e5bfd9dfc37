//! # Session Test Utilities
//!
//! Mock capabilities for exercising `CallSession` without a vendor RTC
//! client, capture devices or a running Token Service.
//!
//! ## Modules
//!
//! - `mock_transport` - Scriptable `RtcTransport` that records calls and
//!   lets tests push remote events
//! - `mock_media` - Mock capture devices plus local/remote tracks with
//!   play/stop/close counters
//! - `mock_credentials` - Canned `CredentialProvider` responses
//! - `recording_notifier` - `Notifier` that keeps every message
//!
//! ## Usage
//!
//! ```rust,ignore
//! use session_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let harness = SessionHarness::new();
//!     let mut session = harness.session();
//!
//!     assert_eq!(session.join(CallMode::Video).await, JoinOutcome::Joined);
//!     harness.transport.emit(TransportEvent::Left(ParticipantId(7)));
//! }
//! ```

pub mod mock_credentials;
pub mod mock_media;
pub mod mock_transport;
pub mod recording_notifier;

pub use mock_credentials::*;
pub use mock_media::*;
pub use mock_transport::*;
pub use recording_notifier::*;

use call_session::{CallSession, SessionCapabilities};
use std::sync::Arc;

/// One set of mocks wired into a session.
///
/// Each field stays reachable after the session is built, so a test can
/// script failures up front and inspect recorded calls afterwards.
pub struct SessionHarness {
    pub transport: Arc<MockTransport>,
    pub devices: Arc<MockMediaDevices>,
    pub credentials: Arc<MockCredentialProvider>,
    pub notifier: Arc<RecordingNotifier>,
}

impl SessionHarness {
    /// Mocks that let every join succeed.
    pub fn new() -> Self {
        Self::with(
            MockTransport::new(),
            MockMediaDevices::new(),
            MockCredentialProvider::valid(),
        )
    }

    /// Mocks built from explicit parts.
    pub fn with(
        transport: MockTransport,
        devices: MockMediaDevices,
        credentials: MockCredentialProvider,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            devices: Arc::new(devices),
            credentials: Arc::new(credentials),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    /// Capabilities sharing this harness's mocks.
    pub fn capabilities(&self) -> SessionCapabilities {
        SessionCapabilities {
            transport: self.transport.clone(),
            devices: self.devices.clone(),
            credentials: self.credentials.clone(),
            notifier: self.notifier.clone(),
        }
    }

    /// A fresh idle session on the global channel.
    pub fn session(&self) -> CallSession {
        CallSession::new(self.capabilities())
    }
}

impl Default for SessionHarness {
    fn default() -> Self {
        Self::new()
    }
}
