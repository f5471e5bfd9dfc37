//! The call session state machine.
//!
//! `CallSession` owns every piece of call state and takes `&mut self` for
//! each operation, so operations never interleave. Transitions:
//!
//! ```text
//! Idle --join--> Joining --ok--> InCall --leave--> LeavingCleanup --> Idle
//!                   |
//!                   +--error--> Idle (local tracks released, transport left)
//! ```

use crate::credentials::CredentialProvider;
use crate::errors::SessionError;
use crate::media::{CallMode, LocalTracks, MediaDevices, MediaKind, SurfaceId};
use crate::notifier::{Notifier, CREDENTIAL_MISSING_MESSAGE, JOIN_FAILED_MESSAGE};
use crate::participants::RemoteParticipants;
use crate::render::RemoteVideoView;
use crate::transport::{EventSubscription, RtcTransport, TransportEvent};
use common::types::{ChannelName, ParticipantId};
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Participant IDs are drawn uniformly from `0..PARTICIPANT_ID_RANGE`.
pub const PARTICIPANT_ID_RANGE: u32 = 1_000_000;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Joining,
    InCall,
    /// Transient, only observable from inside `leave`.
    LeavingCleanup,
}

/// Result of [`CallSession::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The session is now in a call.
    Joined,
    /// A join was already in progress or a call is active; nothing happened.
    AlreadyActive,
    /// The join failed, the user was notified and the session is Idle.
    Failed,
}

/// Capabilities a session runs on.
pub struct SessionCapabilities {
    pub transport: Arc<dyn RtcTransport>,
    pub devices: Arc<dyn MediaDevices>,
    pub credentials: Arc<dyn CredentialProvider>,
    pub notifier: Arc<dyn Notifier>,
}

/// Drives one user's participation in the shared channel.
pub struct CallSession {
    transport: Arc<dyn RtcTransport>,
    devices: Arc<dyn MediaDevices>,
    credentials: Arc<dyn CredentialProvider>,
    notifier: Arc<dyn Notifier>,

    channel: ChannelName,
    state: CallState,
    mode: CallMode,
    participant_id: Option<ParticipantId>,

    local_tracks: Option<LocalTracks>,
    transport_joined: bool,
    microphone_enabled: bool,
    camera_enabled: bool,
    local_preview: Option<SurfaceId>,

    remote: RemoteParticipants,
    remote_view: RemoteVideoView,
    events: Option<EventSubscription>,
    in_call_since: Option<Instant>,
}

impl fmt::Debug for CallSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSession")
            .field("channel", &self.channel)
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("participant_id", &self.participant_id)
            .field("microphone_enabled", &self.microphone_enabled)
            .field("camera_enabled", &self.camera_enabled)
            .field("remote", &self.remote)
            .finish()
    }
}

impl CallSession {
    /// Create an idle session for the shared global channel.
    pub fn new(capabilities: SessionCapabilities) -> Self {
        Self::with_channel(capabilities, ChannelName::global())
    }

    /// Create an idle session for a specific channel.
    pub fn with_channel(capabilities: SessionCapabilities, channel: ChannelName) -> Self {
        Self {
            transport: capabilities.transport,
            devices: capabilities.devices,
            credentials: capabilities.credentials,
            notifier: capabilities.notifier,
            channel,
            state: CallState::Idle,
            mode: CallMode::default(),
            participant_id: None,
            local_tracks: None,
            transport_joined: false,
            microphone_enabled: true,
            camera_enabled: true,
            local_preview: None,
            remote: RemoteParticipants::new(),
            remote_view: RemoteVideoView::new(),
            events: None,
            in_call_since: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn is_in_call(&self) -> bool {
        self.state == CallState::InCall
    }

    pub fn call_mode(&self) -> CallMode {
        self.mode
    }

    pub fn channel(&self) -> &ChannelName {
        &self.channel
    }

    /// This session's participant ID while joining or in a call.
    pub fn participant_id(&self) -> Option<ParticipantId> {
        self.participant_id
    }

    pub fn microphone_enabled(&self) -> bool {
        self.microphone_enabled
    }

    pub fn camera_enabled(&self) -> bool {
        self.camera_enabled
    }

    pub fn has_local_tracks(&self) -> bool {
        self.local_tracks.is_some()
    }

    pub fn remote_participants(&self) -> &RemoteParticipants {
        &self.remote
    }

    /// The remote participant shown in the primary video surface.
    pub fn displayed_remote(&self) -> Option<ParticipantId> {
        self.remote_view.displayed()
    }

    /// Whether this session currently owns an event subscription.
    pub fn is_subscribed(&self) -> bool {
        self.events.is_some()
    }

    /// Whole seconds spent in the current call; zero outside a call.
    pub fn call_duration(&self) -> Duration {
        match (self.state, self.in_call_since) {
            (CallState::InCall, Some(since)) => Duration::from_secs(since.elapsed().as_secs()),
            _ => Duration::ZERO,
        }
    }

    /// [`call_duration`](Self::call_duration) as `HH:MM:SS`.
    pub fn formatted_duration(&self) -> String {
        format_duration(self.call_duration())
    }

    // ------------------------------------------------------------------
    // Surfaces and mode
    // ------------------------------------------------------------------

    /// Register the surface local camera video renders into.
    pub fn attach_local_preview(&mut self, surface: SurfaceId) {
        self.local_preview = Some(surface);
    }

    /// Register the surface the primary remote video renders into.
    pub fn attach_remote_surface(&mut self, surface: SurfaceId) {
        self.remote_view.attach(surface);
        self.remote_view.sync(&self.remote, self.mode);
    }

    /// Choose audio or video before joining. Ignored once a join has started.
    pub fn set_call_mode(&mut self, mode: CallMode) {
        if self.state == CallState::Idle {
            self.mode = mode;
        } else {
            debug!(target: "session.controller", state = ?self.state, requested = %mode, "Ignoring call mode change outside Idle");
        }
    }

    // ------------------------------------------------------------------
    // Join
    // ------------------------------------------------------------------

    /// Join the channel in `mode`.
    ///
    /// Failures never escape: they are logged, shown to the user through the
    /// notifier, and reported as [`JoinOutcome::Failed`] with the session
    /// back in Idle and no local tracks held.
    #[instrument(skip(self), fields(channel = %self.channel))]
    pub async fn join(&mut self, mode: CallMode) -> JoinOutcome {
        if self.state != CallState::Idle {
            debug!(target: "session.controller", state = ?self.state, "Join ignored, session already active");
            return JoinOutcome::AlreadyActive;
        }

        self.set_call_mode(mode);
        self.state = CallState::Joining;

        match self.run_join().await {
            Ok(()) => {
                self.state = CallState::InCall;
                self.in_call_since = Some(Instant::now());
                info!(
                    target: "session.controller",
                    uid = ?self.participant_id,
                    mode = %self.mode,
                    "Joined call"
                );
                JoinOutcome::Joined
            }
            Err(SessionError::MissingCredential) => {
                warn!(target: "session.controller", "Credential response lacked token or app ID");
                self.notifier.notify(CREDENTIAL_MISSING_MESSAGE);
                self.abandon_join().await;
                JoinOutcome::Failed
            }
            Err(e) => {
                error!(target: "session.controller", error = %e, "Join failed");
                self.notifier.notify(JOIN_FAILED_MESSAGE);
                self.abandon_join().await;
                JoinOutcome::Failed
            }
        }
    }

    async fn run_join(&mut self) -> Result<(), SessionError> {
        let uid = generate_participant_id()?;
        self.participant_id = Some(uid);

        let credential = self.credentials.fetch(&self.channel, uid).await?;
        let (Some(token), Some(app_id)) = (credential.token, credential.app_id) else {
            return Err(SessionError::MissingCredential);
        };

        self.transport
            .join(&app_id, &self.channel, &token, uid)
            .await?;
        self.transport_joined = true;

        let tracks = self.devices.create_microphone_and_camera_tracks().await?;
        self.local_tracks = Some(tracks.clone());

        if self.mode == CallMode::Video && self.camera_enabled {
            if let Some(surface) = &self.local_preview {
                tracks.camera.play(surface)?;
            }
        }

        self.transport.publish(&tracks.all()).await?;

        self.events = Some(self.transport.events());
        Ok(())
    }

    /// Roll back whatever a failed join acquired.
    async fn abandon_join(&mut self) {
        self.release_local_tracks();

        if self.transport_joined {
            if let Err(e) = self.transport.leave().await {
                warn!(target: "session.controller", error = %e, "Ignoring transport leave failure after failed join");
            }
            self.transport_joined = false;
        }

        self.close_events();
        self.participant_id = None;
        self.state = CallState::Idle;
    }

    // ------------------------------------------------------------------
    // Leave
    // ------------------------------------------------------------------

    /// Leave the call.
    ///
    /// A no-op when Idle. Local state is fully reset even when the
    /// transport fails; the first transport error is then returned.
    #[instrument(skip(self), fields(channel = %self.channel))]
    pub async fn leave(&mut self) -> Result<(), SessionError> {
        if self.state == CallState::Idle {
            return Ok(());
        }

        self.state = CallState::LeavingCleanup;

        self.close_events();
        self.release_local_tracks();
        self.remote_view.teardown();

        let unpublished = self.transport.unpublish().await;
        let left = self.transport.leave().await;
        self.transport_joined = false;

        self.remote.clear();
        self.microphone_enabled = true;
        self.camera_enabled = true;
        self.participant_id = None;
        self.in_call_since = None;
        self.state = CallState::Idle;

        info!(target: "session.controller", "Left call");

        unpublished.and(left)
    }

    /// Stop and close both local tracks. Failures are logged and ignored.
    fn release_local_tracks(&mut self) {
        let Some(tracks) = self.local_tracks.take() else {
            return;
        };

        for track in tracks.all() {
            if let Err(e) = track.stop() {
                debug!(target: "session.controller", kind = %track.kind(), error = %e, "Ignoring local track stop failure");
            }
            if let Err(e) = track.close() {
                debug!(target: "session.controller", kind = %track.kind(), error = %e, "Ignoring local track close failure");
            }
        }
    }

    fn close_events(&mut self) {
        if let Some(mut events) = self.events.take() {
            events.close();
        }
    }

    // ------------------------------------------------------------------
    // Local controls
    // ------------------------------------------------------------------

    /// Mute or unmute the microphone. No-op without a microphone track.
    pub async fn toggle_microphone(&mut self) -> Result<(), SessionError> {
        let Some(tracks) = &self.local_tracks else {
            return Ok(());
        };

        let next = !self.microphone_enabled;
        tracks.microphone.set_enabled(next).await?;
        self.microphone_enabled = next;
        debug!(target: "session.controller", enabled = next, "Microphone toggled");
        Ok(())
    }

    /// Turn the camera off or on. No-op without a camera track.
    ///
    /// Turning it on renders into the local preview again, since the view
    /// may have dropped the surface while the camera was off.
    pub async fn toggle_camera(&mut self) -> Result<(), SessionError> {
        let Some(tracks) = &self.local_tracks else {
            return Ok(());
        };

        let next = !self.camera_enabled;
        tracks.camera.set_enabled(next).await?;
        self.camera_enabled = next;

        if next {
            if let Some(surface) = &self.local_preview {
                tracks.camera.play(surface)?;
            }
        }

        debug!(target: "session.controller", enabled = next, "Camera toggled");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Remote events
    // ------------------------------------------------------------------

    /// Apply one remote participant event. Ignored outside a call.
    pub async fn handle_event(&mut self, event: TransportEvent) -> Result<(), SessionError> {
        if self.state != CallState::InCall {
            debug!(target: "session.controller", event = ?event, "Ignoring event outside call");
            return Ok(());
        }

        match event {
            TransportEvent::Published(uid, kind) => {
                let Some(track) = self.transport.subscribe(uid, kind).await? else {
                    debug!(target: "session.controller", uid = %uid, kind = %kind, "Subscribe returned no track");
                    return Ok(());
                };

                if kind == MediaKind::Audio {
                    if let Err(e) = track.play(None) {
                        warn!(target: "session.controller", uid = %uid, error = %e, "Failed to play remote audio");
                    }
                }

                if let Some(replaced) = self.remote.set_track(uid, kind, track) {
                    if kind == MediaKind::Audio {
                        if let Err(e) = replaced.stop() {
                            debug!(target: "session.controller", uid = %uid, error = %e, "Ignoring replaced audio stop failure");
                        }
                    }
                }
                debug!(target: "session.controller", uid = %uid, kind = %kind, "Remote track subscribed");
            }
            TransportEvent::Unpublished(uid, kind) => {
                if let Some(track) = self.remote.clear_track(uid, kind) {
                    if kind == MediaKind::Audio {
                        if let Err(e) = track.stop() {
                            debug!(target: "session.controller", uid = %uid, error = %e, "Ignoring remote audio stop failure");
                        }
                    }
                }
                debug!(target: "session.controller", uid = %uid, kind = %kind, "Remote track unpublished");
            }
            TransportEvent::Left(uid) => {
                if let Some(record) = self.remote.remove(uid) {
                    if let Some(audio) = record.audio {
                        if let Err(e) = audio.stop() {
                            debug!(target: "session.controller", uid = %uid, error = %e, "Ignoring remote audio stop failure");
                        }
                    }
                }
                debug!(target: "session.controller", uid = %uid, "Remote participant left");
            }
        }

        self.remote_view.sync(&self.remote, self.mode);
        Ok(())
    }

    /// Wait for the next remote event on this call's subscription.
    /// `None` when there is no subscription or it has ended.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => None,
        }
    }

    /// Apply every event already queued, without waiting. Returns how many
    /// were applied; stops at the first subscribe error.
    pub async fn drain_events(&mut self) -> Result<usize, SessionError> {
        let mut applied = 0;
        loop {
            let Some(event) = self.events.as_mut().and_then(EventSubscription::try_recv) else {
                return Ok(applied);
            };
            self.handle_event(event).await?;
            applied += 1;
        }
    }
}

/// Draw a participant ID from the system CSPRNG.
fn generate_participant_id() -> Result<ParticipantId, SessionError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 4];

    rng.fill(&mut bytes).map_err(|_| {
        error!(target: "session.controller", "Failed to generate random bytes");
        SessionError::Credential("Failed to generate participant ID".to_string())
    })?;

    Ok(ParticipantId(u32::from_le_bytes(bytes) % PARTICIPANT_ID_RANGE))
}

/// Format a duration as `HH:MM:SS`. Hours are not wrapped.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}
