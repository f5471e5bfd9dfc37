//! Mock RTC transport.
//!
//! Records every call, fails the operations a test asks it to, and fans
//! out events pushed with [`MockTransport::emit`] to every subscription
//! that is still open.
//!
//! # Example
//!
//! ```rust,ignore
//! use session_test_utils::MockTransport;
//!
//! let transport = MockTransport::builder().fail_publish().build();
//! ```

use call_session::{
    EventSender, EventSubscription, LocalTrack, MediaKind, RemoteTrack, RtcTransport,
    SessionError, TransportEvent,
};
use crate::mock_media::MockRemoteTrack;
use common::secret::{ExposeSecret, SecretString};
use common::types::{ChannelName, ParticipantId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A call made on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Join {
        app_id: String,
        channel: ChannelName,
        token: String,
        uid: ParticipantId,
    },
    Publish {
        kinds: Vec<MediaKind>,
    },
    Subscribe {
        uid: ParticipantId,
        kind: MediaKind,
    },
    Unpublish,
    Leave,
}

/// Which operations fail.
#[derive(Debug, Clone, Copy, Default)]
struct Failures {
    join: bool,
    publish: bool,
    subscribe: bool,
    unpublish: bool,
    leave: bool,
}

/// Scriptable `RtcTransport`.
#[derive(Debug, Default)]
pub struct MockTransport {
    failures: Failures,
    subscribe_returns_none: bool,
    remote_stop_fails: bool,
    calls: Mutex<Vec<TransportCall>>,
    subscribers: Mutex<Vec<EventSender>>,
    remote_tracks: Mutex<HashMap<(ParticipantId, MediaKind), Arc<MockRemoteTrack>>>,
}

impl MockTransport {
    /// A transport where every operation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder::default()
    }

    /// Deliver `event` to every open subscription. Returns how many
    /// subscriptions received it.
    pub fn emit(&self, event: TransportEvent) -> usize {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers
            .iter()
            .filter(|tx| tx.send(event).is_ok())
            .count()
    }

    /// Subscriptions that have not been closed or dropped.
    pub fn open_subscriptions(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn join_count(&self) -> usize {
        self.count(|c| matches!(c, TransportCall::Join { .. }))
    }

    pub fn publish_count(&self) -> usize {
        self.count(|c| matches!(c, TransportCall::Publish { .. }))
    }

    pub fn unpublish_count(&self) -> usize {
        self.count(|c| matches!(c, TransportCall::Unpublish))
    }

    pub fn leave_count(&self) -> usize {
        self.count(|c| matches!(c, TransportCall::Leave))
    }

    fn count(&self, pred: impl Fn(&TransportCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    /// The remote track handed out for the most recent subscribe to
    /// (`uid`, `kind`).
    pub fn remote_track(&self, uid: ParticipantId, kind: MediaKind) -> Option<Arc<MockRemoteTrack>> {
        self.remote_tracks.lock().unwrap().get(&(uid, kind)).cloned()
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl RtcTransport for MockTransport {
    async fn join(
        &self,
        app_id: &str,
        channel: &ChannelName,
        token: &SecretString,
        uid: ParticipantId,
    ) -> Result<(), SessionError> {
        self.record(TransportCall::Join {
            app_id: app_id.to_string(),
            channel: channel.clone(),
            token: token.expose_secret().to_string(),
            uid,
        });
        if self.failures.join {
            return Err(SessionError::Transport("Mock join failure".to_string()));
        }
        Ok(())
    }

    async fn publish(&self, tracks: &[Arc<dyn LocalTrack>]) -> Result<(), SessionError> {
        self.record(TransportCall::Publish {
            kinds: tracks.iter().map(|t| t.kind()).collect(),
        });
        if self.failures.publish {
            return Err(SessionError::Transport("Mock publish failure".to_string()));
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        uid: ParticipantId,
        kind: MediaKind,
    ) -> Result<Option<Arc<dyn RemoteTrack>>, SessionError> {
        self.record(TransportCall::Subscribe { uid, kind });
        if self.failures.subscribe {
            return Err(SessionError::Transport("Mock subscribe failure".to_string()));
        }
        if self.subscribe_returns_none {
            return Ok(None);
        }

        let track = Arc::new(if self.remote_stop_fails {
            MockRemoteTrack::with_failing_stop(kind)
        } else {
            MockRemoteTrack::new(kind)
        });
        self.remote_tracks
            .lock()
            .unwrap()
            .insert((uid, kind), Arc::clone(&track));
        let track: Arc<dyn RemoteTrack> = track;
        Ok(Some(track))
    }

    async fn unpublish(&self) -> Result<(), SessionError> {
        self.record(TransportCall::Unpublish);
        if self.failures.unpublish {
            return Err(SessionError::Transport("Mock unpublish failure".to_string()));
        }
        Ok(())
    }

    async fn leave(&self) -> Result<(), SessionError> {
        self.record(TransportCall::Leave);
        if self.failures.leave {
            return Err(SessionError::Transport("Mock leave failure".to_string()));
        }
        Ok(())
    }

    fn events(&self) -> EventSubscription {
        let (tx, subscription) = EventSubscription::channel();
        self.subscribers.lock().unwrap().push(tx);
        subscription
    }
}

/// Builder for [`MockTransport`].
#[derive(Debug, Default)]
pub struct MockTransportBuilder {
    failures: Failures,
    subscribe_returns_none: bool,
    remote_stop_fails: bool,
}

impl MockTransportBuilder {
    #[must_use]
    pub fn fail_join(mut self) -> Self {
        self.failures.join = true;
        self
    }

    #[must_use]
    pub fn fail_publish(mut self) -> Self {
        self.failures.publish = true;
        self
    }

    #[must_use]
    pub fn fail_subscribe(mut self) -> Self {
        self.failures.subscribe = true;
        self
    }

    #[must_use]
    pub fn fail_unpublish(mut self) -> Self {
        self.failures.unpublish = true;
        self
    }

    #[must_use]
    pub fn fail_leave(mut self) -> Self {
        self.failures.leave = true;
        self
    }

    /// Subscribe succeeds but yields no track.
    #[must_use]
    pub fn subscribe_returns_none(mut self) -> Self {
        self.subscribe_returns_none = true;
        self
    }

    /// Remote tracks handed out by subscribe fail to stop.
    #[must_use]
    pub fn remote_stop_fails(mut self) -> Self {
        self.remote_stop_fails = true;
        self
    }

    #[must_use]
    pub fn build(self) -> MockTransport {
        MockTransport {
            failures: self.failures,
            subscribe_returns_none: self.subscribe_returns_none,
            remote_stop_fails: self.remote_stop_fails,
            ..MockTransport::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_reaches_open_subscriptions_only() {
        let transport = MockTransport::new();
        let mut first = transport.events();
        let mut second = transport.events();
        assert_eq!(transport.open_subscriptions(), 2);

        second.close();
        assert_eq!(transport.open_subscriptions(), 1);

        let delivered = transport.emit(TransportEvent::Left(ParticipantId(4)));
        assert_eq!(delivered, 1);
        assert_eq!(first.try_recv(), Some(TransportEvent::Left(ParticipantId(4))));
    }

    #[tokio::test]
    async fn test_scripted_failures_are_recorded() {
        let transport = MockTransport::builder().fail_leave().build();

        assert!(transport.unpublish().await.is_ok());
        assert!(transport.leave().await.is_err());
        assert_eq!(
            transport.calls(),
            vec![TransportCall::Unpublish, TransportCall::Leave]
        );
    }

    #[tokio::test]
    async fn test_subscribe_hands_out_trackable_handles() {
        let transport = MockTransport::new();
        let track = transport
            .subscribe(ParticipantId(8), MediaKind::Audio)
            .await
            .unwrap()
            .unwrap();

        track.play(None).unwrap();

        let mock = transport.remote_track(ParticipantId(8), MediaKind::Audio).unwrap();
        assert!(mock.is_playing());
    }
}
