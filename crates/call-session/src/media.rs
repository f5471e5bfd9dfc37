//! Media capabilities.
//!
//! Local and remote tracks are opaque handles owned by the RTC transport's
//! media engine. The controller only ever enables, renders, stops, or
//! releases them through these traits.

use crate::errors::SessionError;
use std::fmt;
use std::sync::Arc;

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Call mode chosen before joining.
///
/// Both modes capture and publish microphone and camera; the mode only
/// decides whether video is rendered locally and remotely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallMode {
    #[default]
    Video,
    Audio,
}

impl fmt::Display for CallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallMode::Video => write!(f, "video"),
            CallMode::Audio => write!(f, "audio"),
        }
    }
}

/// Identifier of a rendering surface owned by the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceId(String);

impl SurfaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A locally captured track (microphone or camera).
#[async_trait::async_trait]
pub trait LocalTrack: Send + Sync {
    /// Which kind of media this track captures.
    fn kind(&self) -> MediaKind;

    /// Mute or unmute the capture without releasing the device.
    async fn set_enabled(&self, enabled: bool) -> Result<(), SessionError>;

    /// Render the capture into a surface.
    fn play(&self, surface: &SurfaceId) -> Result<(), SessionError>;

    /// Stop rendering.
    fn stop(&self) -> Result<(), SessionError>;

    /// Release the capture device. The track is unusable afterwards.
    fn close(&self) -> Result<(), SessionError>;
}

/// A subscribed track from a remote participant.
pub trait RemoteTrack: Send + Sync {
    /// Which kind of media this track carries.
    fn kind(&self) -> MediaKind;

    /// Start playback. Audio plays without a surface; video needs one.
    fn play(&self, surface: Option<&SurfaceId>) -> Result<(), SessionError>;

    /// Stop playback.
    fn stop(&self) -> Result<(), SessionError>;
}

/// The pair of local tracks created for a call.
#[derive(Clone)]
pub struct LocalTracks {
    pub microphone: Arc<dyn LocalTrack>,
    pub camera: Arc<dyn LocalTrack>,
}

impl LocalTracks {
    /// Both tracks, microphone first, in the order they are published.
    pub fn all(&self) -> [Arc<dyn LocalTrack>; 2] {
        [Arc::clone(&self.microphone), Arc::clone(&self.camera)]
    }
}

impl fmt::Debug for LocalTracks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTracks")
            .field("microphone", &self.microphone.kind())
            .field("camera", &self.camera.kind())
            .finish()
    }
}

/// Capture device access.
#[async_trait::async_trait]
pub trait MediaDevices: Send + Sync {
    /// Open the default microphone and camera.
    async fn create_microphone_and_camera_tracks(&self) -> Result<LocalTracks, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_mode_defaults_to_video() {
        assert_eq!(CallMode::default(), CallMode::Video);
    }

    #[test]
    fn test_display() {
        assert_eq!(MediaKind::Audio.to_string(), "audio");
        assert_eq!(MediaKind::Video.to_string(), "video");
        assert_eq!(CallMode::Audio.to_string(), "audio");
        assert_eq!(SurfaceId::new("local-preview").to_string(), "local-preview");
    }
}
