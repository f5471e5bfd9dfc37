//! Call Session Controller
//!
//! Drives one user's participation in a shared RTC channel: fetches a join
//! credential, joins the transport, captures and publishes microphone and
//! camera, subscribes to remote participants' tracks, and tears everything
//! down on leave.
//!
//! The vendor RTC client, capture devices, credential source and user
//! notifications are all injected as capability traits, so the controller
//! holds no global state and can be exercised entirely with mocks.
//!
//! # Modules
//!
//! - `credentials` - `CredentialProvider` and the Token Service HTTP client
//! - `errors` - `SessionError`
//! - `media` - Local/remote track capabilities, call mode, surfaces
//! - `notifier` - User-visible notifications
//! - `participants` - Remote participant registry
//! - `render` - Primary remote video view
//! - `session` - The `CallSession` state machine
//! - `transport` - `RtcTransport` and its event subscription

pub mod credentials;
pub mod errors;
pub mod media;
pub mod notifier;
pub mod participants;
pub mod render;
pub mod session;
pub mod transport;

pub use credentials::{CredentialProvider, FetchedCredential, HttpCredentialClient};
pub use errors::SessionError;
pub use media::{CallMode, LocalTrack, LocalTracks, MediaDevices, MediaKind, RemoteTrack, SurfaceId};
pub use notifier::Notifier;
pub use session::{CallSession, CallState, JoinOutcome, SessionCapabilities};
pub use transport::{EventSender, EventSubscription, RtcTransport, TransportEvent};
