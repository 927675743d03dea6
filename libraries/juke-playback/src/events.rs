//! Playback Events
//!
//! Broadcast notifications for hosts that want to react to changes rather than
//! diff snapshots. Events are emitted at key points:
//! - Every wholesale state replacement (with its origin)
//! - Track and play/pause transitions
//! - Local progress ticks
//! - Busy and error changes
//! - Responses dropped by the identity guard

use crate::error::PlaybackErrorKind;
use serde::{Deserialize, Serialize};

/// Which writer replaced the playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateOrigin {
    /// Local guess applied ahead of a control call
    Optimistic,
    /// Pre-action state restored after a failed control call
    Rollback,
    /// Fetched from the provider
    Reconciled,
    /// Body returned by a control call
    ControlResponse,
    /// Local progress simulation
    Tick,
    /// Session ended
    SignedOut,
}

/// Events emitted by the synchronization engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// The playback state was replaced
    StateReplaced {
        /// Writer that replaced it
        origin: StateOrigin,
    },

    /// The loaded track changed
    TrackChanged {
        /// URI of the new track (if any)
        track_uri: Option<String>,
        /// URI of the previous track (if any)
        previous_track_uri: Option<String>,
    },

    /// Play/pause flag flipped
    PlayingChanged { is_playing: bool },

    /// Local progress tick
    PositionUpdate {
        /// Current playback position
        progress_ms: u64,
        /// Known track duration
        duration_ms: Option<u64>,
    },

    /// A user-blocking control call started or the last one finished
    BusyChanged { is_busy: bool },

    /// An error was surfaced
    ErrorRaised {
        kind: PlaybackErrorKind,
        message: String,
    },

    /// A response was dropped because it no longer matches the pending intent
    ResponseDiscarded { origin: StateOrigin },

    /// Sign-out tore the session down
    SessionEnded,
}

impl PlaybackEvent {
    /// Whether a UI needs to redraw track metadata for this event
    pub fn affects_track_display(&self) -> bool {
        matches!(
            self,
            Self::TrackChanged { .. } | Self::SessionEnded | Self::StateReplaced { .. }
        )
    }
}
