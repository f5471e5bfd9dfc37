//! Remote participant registry.
//!
//! One record per remote participant, keyed by participant ID. A record
//! holds at most one audio and one video handle. It is created by the first
//! published track, survives kind-scoped unpublishes (possibly with no
//! handles at all), and is removed only when the participant leaves.

use crate::media::{MediaKind, RemoteTrack};
use common::types::ParticipantId;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Tracks currently held for one remote participant.
#[derive(Clone, Default)]
pub struct RemoteParticipant {
    pub audio: Option<Arc<dyn RemoteTrack>>,
    pub video: Option<Arc<dyn RemoteTrack>>,
}

impl RemoteParticipant {
    /// The handle for `kind`, if any.
    pub fn track(&self, kind: MediaKind) -> Option<&Arc<dyn RemoteTrack>> {
        match kind {
            MediaKind::Audio => self.audio.as_ref(),
            MediaKind::Video => self.video.as_ref(),
        }
    }

    fn slot(&mut self, kind: MediaKind) -> &mut Option<Arc<dyn RemoteTrack>> {
        match kind {
            MediaKind::Audio => &mut self.audio,
            MediaKind::Video => &mut self.video,
        }
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }
}

impl fmt::Debug for RemoteParticipant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteParticipant")
            .field("audio", &self.has_audio())
            .field("video", &self.has_video())
            .finish()
    }
}

/// All known remote participants, ordered by participant ID.
#[derive(Debug, Default)]
pub struct RemoteParticipants {
    records: BTreeMap<ParticipantId, RemoteParticipant>,
}

impl RemoteParticipants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `track` as the participant's handle for `kind`, creating the
    /// record if needed. Returns the handle it replaced.
    pub fn set_track(
        &mut self,
        uid: ParticipantId,
        kind: MediaKind,
        track: Arc<dyn RemoteTrack>,
    ) -> Option<Arc<dyn RemoteTrack>> {
        self.records.entry(uid).or_default().slot(kind).replace(track)
    }

    /// Clear the participant's handle for `kind`. The record itself and the
    /// other kind are untouched. Unknown participants are ignored.
    pub fn clear_track(&mut self, uid: ParticipantId, kind: MediaKind) -> Option<Arc<dyn RemoteTrack>> {
        self.records
            .get_mut(&uid)
            .and_then(|record| record.slot(kind).take())
    }

    /// Remove the participant's record regardless of what it holds.
    pub fn remove(&mut self, uid: ParticipantId) -> Option<RemoteParticipant> {
        self.records.remove(&uid)
    }

    pub fn get(&self, uid: ParticipantId) -> Option<&RemoteParticipant> {
        self.records.get(&uid)
    }

    pub fn contains(&self, uid: ParticipantId) -> bool {
        self.records.contains_key(&uid)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, &RemoteParticipant)> {
        self.records.iter().map(|(uid, record)| (*uid, record))
    }

    /// The lowest-ID participant that currently has a video handle.
    pub fn first_with_video(&self) -> Option<(ParticipantId, Arc<dyn RemoteTrack>)> {
        self.records
            .iter()
            .find_map(|(uid, record)| record.video.as_ref().map(|v| (*uid, Arc::clone(v))))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::errors::SessionError;
    use crate::media::SurfaceId;

    struct StubTrack(MediaKind);

    impl RemoteTrack for StubTrack {
        fn kind(&self) -> MediaKind {
            self.0
        }

        fn play(&self, _surface: Option<&SurfaceId>) -> Result<(), SessionError> {
            Ok(())
        }

        fn stop(&self) -> Result<(), SessionError> {
            Ok(())
        }
    }

    fn track(kind: MediaKind) -> Arc<dyn RemoteTrack> {
        Arc::new(StubTrack(kind))
    }

    #[test]
    fn test_audio_then_video_shares_one_record() {
        let mut participants = RemoteParticipants::new();
        let uid = ParticipantId(7);

        participants.set_track(uid, MediaKind::Audio, track(MediaKind::Audio));
        participants.set_track(uid, MediaKind::Video, track(MediaKind::Video));

        assert_eq!(participants.len(), 1);
        let record = participants.get(uid).unwrap();
        assert!(record.has_audio());
        assert!(record.has_video());
    }

    #[test]
    fn test_clear_track_keeps_record_and_other_kind() {
        let mut participants = RemoteParticipants::new();
        let uid = ParticipantId(7);
        participants.set_track(uid, MediaKind::Audio, track(MediaKind::Audio));
        participants.set_track(uid, MediaKind::Video, track(MediaKind::Video));

        let cleared = participants.clear_track(uid, MediaKind::Audio);

        assert!(cleared.is_some());
        let record = participants.get(uid).unwrap();
        assert!(!record.has_audio());
        assert!(record.has_video());

        participants.clear_track(uid, MediaKind::Video);
        assert!(participants.contains(uid), "empty record stays until left");
    }

    #[test]
    fn test_clear_track_for_unknown_participant_is_ignored() {
        let mut participants = RemoteParticipants::new();
        assert!(participants
            .clear_track(ParticipantId(1), MediaKind::Video)
            .is_none());
        assert!(participants.is_empty());
    }

    #[test]
    fn test_remove_drops_record_with_video() {
        let mut participants = RemoteParticipants::new();
        let uid = ParticipantId(9);
        participants.set_track(uid, MediaKind::Video, track(MediaKind::Video));

        assert!(participants.remove(uid).is_some());
        assert!(!participants.contains(uid));
        assert!(participants.remove(uid).is_none());
    }

    #[test]
    fn test_set_track_returns_replaced_handle() {
        let mut participants = RemoteParticipants::new();
        let uid = ParticipantId(3);

        assert!(participants
            .set_track(uid, MediaKind::Video, track(MediaKind::Video))
            .is_none());
        assert!(participants
            .set_track(uid, MediaKind::Video, track(MediaKind::Video))
            .is_some());
    }

    #[test]
    fn test_first_with_video_uses_id_order() {
        let mut participants = RemoteParticipants::new();
        participants.set_track(ParticipantId(50), MediaKind::Video, track(MediaKind::Video));
        participants.set_track(ParticipantId(10), MediaKind::Audio, track(MediaKind::Audio));
        participants.set_track(ParticipantId(20), MediaKind::Video, track(MediaKind::Video));

        let (uid, _) = participants.first_with_video().unwrap();
        assert_eq!(uid, ParticipantId(20));

        participants.clear();
        assert!(participants.first_with_video().is_none());
    }
}
