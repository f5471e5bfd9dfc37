//! Mock capture devices and tracks.
//!
//! Every track counts the calls made on it so tests can assert that the
//! controller started, stopped and released what it should have.

use call_session::{LocalTrack, LocalTracks, MediaDevices, MediaKind, RemoteTrack, SessionError, SurfaceId};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Local tracks
// ============================================================================

/// A local capture track.
#[derive(Debug)]
pub struct MockLocalTrack {
    kind: MediaKind,
    enabled: AtomicBool,
    set_enabled_calls: AtomicUsize,
    plays: AtomicUsize,
    stops: AtomicUsize,
    closes: AtomicUsize,
    last_surface: Mutex<Option<SurfaceId>>,
    fail_play: bool,
    fail_release: bool,
}

impl MockLocalTrack {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            enabled: AtomicBool::new(true),
            set_enabled_calls: AtomicUsize::new(0),
            plays: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            last_surface: Mutex::new(None),
            fail_play: false,
            fail_release: false,
        }
    }

    /// Make `play` fail.
    #[must_use]
    pub fn failing_play(mut self) -> Self {
        self.fail_play = true;
        self
    }

    /// Make `stop` and `close` fail (after counting the call).
    #[must_use]
    pub fn failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled_calls(&self) -> usize {
        self.set_enabled_calls.load(Ordering::SeqCst)
    }

    pub fn play_count(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Stopped and closed at least once.
    pub fn is_released(&self) -> bool {
        self.stop_count() > 0 && self.close_count() > 0
    }

    pub fn last_surface(&self) -> Option<SurfaceId> {
        self.last_surface.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LocalTrack for MockLocalTrack {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    async fn set_enabled(&self, enabled: bool) -> Result<(), SessionError> {
        self.set_enabled_calls.fetch_add(1, Ordering::SeqCst);
        self.enabled.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    fn play(&self, surface: &SurfaceId) -> Result<(), SessionError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail_play {
            return Err(SessionError::Media("Mock play failure".to_string()));
        }
        *self.last_surface.lock().unwrap() = Some(surface.clone());
        Ok(())
    }

    fn stop(&self) -> Result<(), SessionError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            return Err(SessionError::Media("Mock stop failure".to_string()));
        }
        Ok(())
    }

    fn close(&self) -> Result<(), SessionError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            return Err(SessionError::Media("Mock close failure".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Devices
// ============================================================================

/// The concrete tracks handed out by one `create_microphone_and_camera_tracks` call.
#[derive(Debug, Clone)]
pub struct CreatedTracks {
    pub microphone: Arc<MockLocalTrack>,
    pub camera: Arc<MockLocalTrack>,
}

/// Capture devices that hand out [`MockLocalTrack`]s.
#[derive(Debug, Default)]
pub struct MockMediaDevices {
    fail_create: bool,
    fail_camera_play: bool,
    fail_release: bool,
    created: Mutex<Vec<CreatedTracks>>,
}

impl MockMediaDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail to open the devices.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    /// Hand out a camera whose `play` fails.
    #[must_use]
    pub fn with_failing_camera_play(mut self) -> Self {
        self.fail_camera_play = true;
        self
    }

    /// Hand out tracks whose `stop`/`close` fail.
    #[must_use]
    pub fn with_failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }

    /// Tracks from every successful call, oldest first.
    pub fn created(&self) -> Vec<CreatedTracks> {
        self.created.lock().unwrap().clone()
    }

    /// Tracks from the most recent successful call.
    pub fn last_created(&self) -> Option<CreatedTracks> {
        self.created.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl MediaDevices for MockMediaDevices {
    async fn create_microphone_and_camera_tracks(&self) -> Result<LocalTracks, SessionError> {
        if self.fail_create {
            return Err(SessionError::Media("Mock device failure".to_string()));
        }

        let mut microphone = MockLocalTrack::new(MediaKind::Audio);
        let mut camera = MockLocalTrack::new(MediaKind::Video);
        if self.fail_release {
            microphone = microphone.failing_release();
            camera = camera.failing_release();
        }
        if self.fail_camera_play {
            camera = camera.failing_play();
        }

        let created = CreatedTracks {
            microphone: Arc::new(microphone),
            camera: Arc::new(camera),
        };
        self.created.lock().unwrap().push(created.clone());

        Ok(LocalTracks {
            microphone: created.microphone,
            camera: created.camera,
        })
    }
}

// ============================================================================
// Remote tracks
// ============================================================================

/// A subscribed remote track.
#[derive(Debug)]
pub struct MockRemoteTrack {
    kind: MediaKind,
    plays: AtomicUsize,
    stops: AtomicUsize,
    last_surface: Mutex<Option<SurfaceId>>,
    playing: AtomicBool,
    fail_stop: bool,
}

impl MockRemoteTrack {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            plays: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            last_surface: Mutex::new(None),
            playing: AtomicBool::new(false),
            fail_stop: false,
        }
    }

    /// A track whose `stop` is counted but returns an error.
    pub fn with_failing_stop(kind: MediaKind) -> Self {
        Self {
            fail_stop: true,
            ..Self::new(kind)
        }
    }

    pub fn play_count(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Played and not stopped since.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn last_surface(&self) -> Option<SurfaceId> {
        self.last_surface.lock().unwrap().clone()
    }
}

impl RemoteTrack for MockRemoteTrack {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn play(&self, surface: Option<&SurfaceId>) -> Result<(), SessionError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.playing.store(true, Ordering::SeqCst);
        *self.last_surface.lock().unwrap() = surface.cloned();
        Ok(())
    }

    fn stop(&self) -> Result<(), SessionError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(SessionError::Media("Mock remote stop failure".to_string()));
        }
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }
}
