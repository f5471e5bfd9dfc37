//! RTC transport capability and its remote event stream.

use crate::errors::SessionError;
use crate::media::{LocalTrack, MediaKind, RemoteTrack};
use common::secret::SecretString;
use common::types::{ChannelName, ParticipantId};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Remote participant activity delivered by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// A participant started publishing a track of this kind.
    Published(ParticipantId, MediaKind),
    /// A participant stopped publishing a track of this kind.
    Unpublished(ParticipantId, MediaKind),
    /// A participant left the channel.
    Left(ParticipantId),
}

/// Sending half of an event subscription, held by the transport.
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// Receiving half of an event subscription, owned by the controller.
///
/// Events are yielded in the order the transport sent them. Closing the
/// subscription makes further sends fail, so a transport can prune
/// subscribers left over from earlier calls.
#[derive(Debug)]
pub struct EventSubscription {
    rx: mpsc::UnboundedReceiver<TransportEvent>,
}

impl EventSubscription {
    /// Create a connected sender/subscription pair.
    pub fn channel() -> (EventSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Wait for the next event. `None` once every sender is gone or the
    /// subscription is closed and drained.
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.rx.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<TransportEvent> {
        self.rx.try_recv().ok()
    }

    /// Stop accepting events.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// The vendor RTC client, seen from the controller.
#[async_trait::async_trait]
pub trait RtcTransport: Send + Sync {
    /// Join a channel as `uid`.
    async fn join(
        &self,
        app_id: &str,
        channel: &ChannelName,
        token: &SecretString,
        uid: ParticipantId,
    ) -> Result<(), SessionError>;

    /// Publish local tracks to the channel.
    async fn publish(&self, tracks: &[Arc<dyn LocalTrack>]) -> Result<(), SessionError>;

    /// Subscribe to a remote participant's track. `None` when the
    /// participant no longer publishes that kind.
    async fn subscribe(
        &self,
        uid: ParticipantId,
        kind: MediaKind,
    ) -> Result<Option<Arc<dyn RemoteTrack>>, SessionError>;

    /// Unpublish every local track.
    async fn unpublish(&self) -> Result<(), SessionError>;

    /// Leave the channel.
    async fn leave(&self) -> Result<(), SessionError>;

    /// Open a new subscription to remote participant events.
    fn events(&self) -> EventSubscription;
}
