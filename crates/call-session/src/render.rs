//! The primary remote video view.
//!
//! Only one remote video is shown at a time. After any change to the
//! participant registry the controller calls [`RemoteVideoView::sync`],
//! which picks the lowest-ID participant with a video handle (in video
//! mode only) and switches playback when the pick changes.

use crate::media::{CallMode, RemoteTrack, SurfaceId};
use crate::participants::RemoteParticipants;
use common::types::ParticipantId;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Default)]
pub struct RemoteVideoView {
    surface: Option<SurfaceId>,
    active: Option<(ParticipantId, Arc<dyn RemoteTrack>)>,
}

impl RemoteVideoView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render into `surface` from now on. Whatever is playing is stopped;
    /// the next [`sync`](Self::sync) starts it again on the new surface.
    pub fn attach(&mut self, surface: SurfaceId) {
        self.teardown();
        self.surface = Some(surface);
    }

    /// The participant whose video is on screen.
    pub fn displayed(&self) -> Option<ParticipantId> {
        self.active.as_ref().map(|(uid, _)| *uid)
    }

    pub fn surface(&self) -> Option<&SurfaceId> {
        self.surface.as_ref()
    }

    /// Bring playback in line with the registry.
    pub fn sync(&mut self, participants: &RemoteParticipants, mode: CallMode) {
        let Some(surface) = self.surface.clone() else {
            return;
        };

        let wanted = match mode {
            CallMode::Video => participants.first_with_video(),
            CallMode::Audio => None,
        };

        let unchanged = match (&self.active, &wanted) {
            (Some((a_uid, a_track)), Some((w_uid, w_track))) => {
                a_uid == w_uid && Arc::ptr_eq(a_track, w_track)
            }
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        self.teardown();

        if let Some((uid, track)) = wanted {
            if let Err(e) = track.play(Some(&surface)) {
                warn!(target: "session.render", uid = %uid, error = %e, "Failed to play remote video");
            }
            debug!(target: "session.render", uid = %uid, surface = %surface, "Showing remote video");
            self.active = Some((uid, track));
        }
    }

    /// Stop the active remote video, if any.
    pub fn teardown(&mut self) {
        if let Some((uid, track)) = self.active.take() {
            if let Err(e) = track.stop() {
                debug!(target: "session.render", uid = %uid, error = %e, "Ignoring remote video stop failure");
            }
        }
    }
}
