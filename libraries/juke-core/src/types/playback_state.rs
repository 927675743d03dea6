/// Remote playback snapshot
use super::{Device, ProviderName, Track};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of the provider's playback session.
///
/// A value type. Writers build a new snapshot and replace the old one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Active streaming backend
    pub provider: ProviderName,

    /// Whether the provider is currently playing
    pub is_playing: bool,

    /// Position in milliseconds, never past the known duration
    pub progress_ms: u64,

    /// Loaded track, if known
    pub track: Option<Track>,

    /// Device playback is routed to, if known
    pub device: Option<Device>,

    /// Local time of the last known-good confirmation
    pub updated_at: DateTime<Utc>,
}

impl PlaybackState {
    /// A paused, empty snapshot for `provider`
    pub fn idle(provider: ProviderName) -> Self {
        Self {
            provider,
            is_playing: false,
            progress_ms: 0,
            track: None,
            device: None,
            updated_at: Utc::now(),
        }
    }

    /// Known, non-zero track duration
    pub fn duration_ms(&self) -> Option<u64> {
        self.track.as_ref().and_then(Track::known_duration_ms)
    }

    /// Control URI of the loaded track
    pub fn track_uri(&self) -> Option<String> {
        self.track
            .as_ref()
            .and_then(|track| track.playable_uri(&self.provider))
    }

    /// `(provider, track uri)` pair that identifies what is loaded
    pub fn identity(&self) -> (&ProviderName, Option<String>) {
        (&self.provider, self.track_uri())
    }

    /// Device id to target control calls at
    pub fn device_id(&self) -> Option<&str> {
        self.device.as_ref().and_then(Device::control_id)
    }

    /// Same snapshot with `progress_ms` clamped to the known duration
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.progress_ms = clamp_progress(self.progress_ms, self.duration_ms());
        self
    }

    /// Snapshot advanced by `elapsed_ms` of simulated playback.
    ///
    /// Keeps `updated_at`, since a simulated advance is not a confirmation.
    #[must_use]
    pub fn advanced(&self, elapsed_ms: u64) -> Self {
        let mut next = self.clone();
        next.progress_ms = clamp_progress(
            self.progress_ms.saturating_add(elapsed_ms),
            self.duration_ms(),
        );
        next
    }
}

/// Clamp a position to `[0, duration]`, leaving it as-is when the duration is unknown
pub fn clamp_progress(progress_ms: u64, duration_ms: Option<u64>) -> u64 {
    match duration_ms {
        Some(duration) => progress_ms.min(duration),
        None => progress_ms,
    }
}
