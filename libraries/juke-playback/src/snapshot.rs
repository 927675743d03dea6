//! Read-only view of the engine handed to UI collaborators

use crate::error::PlaybackError;
use juke_core::{PlaybackState, ProviderName};

/// What a UI renders from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    /// Current mirror of the remote session
    pub state: Option<PlaybackState>,

    /// Provider the next control call will target
    pub provider: ProviderName,

    /// Last surfaced error
    pub error: Option<PlaybackError>,

    /// A user-blocking control call is in flight
    pub is_busy: bool,

    /// An authenticated session exists
    pub can_control: bool,
}

impl PlaybackSnapshot {
    pub(crate) fn empty(provider: ProviderName) -> Self {
        Self {
            state: None,
            provider,
            error: None,
            is_busy: false,
            can_control: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.is_playing)
    }

    /// URI of the loaded track
    pub fn active_track_uri(&self) -> Option<String> {
        self.state.as_ref().and_then(PlaybackState::track_uri)
    }

    pub fn progress_ms(&self) -> u64 {
        self.state.as_ref().map_or(0, |s| s.progress_ms)
    }

    /// Known, non-zero duration of the loaded track
    pub fn duration_ms(&self) -> Option<u64> {
        self.state.as_ref().and_then(PlaybackState::duration_ms)
    }

    pub fn has_track(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.track.is_some())
    }
}
