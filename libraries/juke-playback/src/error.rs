//! Error types for playback synchronization

use juke_core::{GatewayError, GatewayErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playback errors
///
/// The `Display` text is what a UI shows to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// No auth token; refused before any network call
    #[error("Sign in to control playback.")]
    Unauthenticated,

    /// The track has neither a usable URI nor an id to derive one from
    #[error("This track is missing a playable provider reference.")]
    MissingPlayableReference,

    /// Blank context URI passed to `play_context`
    #[error("Missing playback context.")]
    MissingContext,

    /// Network or provider failure, message passed through verbatim
    #[error("{message}")]
    Gateway {
        /// Classification reported by the gateway
        kind: GatewayErrorKind,
        /// Message from the gateway
        message: String,
    },
}

/// Stable classification of a `PlaybackError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackErrorKind {
    Unauthenticated,
    MissingPlayableReference,
    MissingContext,
    GatewayFailure,
}

impl PlaybackErrorKind {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::MissingPlayableReference => "MissingPlayableReference",
            Self::MissingContext => "MissingContext",
            Self::GatewayFailure => "GatewayFailure",
        }
    }
}

impl std::fmt::Display for PlaybackErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PlaybackError {
    /// Classify the error
    #[must_use]
    pub fn kind(&self) -> PlaybackErrorKind {
        match self {
            Self::Unauthenticated => PlaybackErrorKind::Unauthenticated,
            Self::MissingPlayableReference => PlaybackErrorKind::MissingPlayableReference,
            Self::MissingContext => PlaybackErrorKind::MissingContext,
            Self::Gateway { .. } => PlaybackErrorKind::GatewayFailure,
        }
    }
}

impl From<GatewayError> for PlaybackError {
    fn from(err: GatewayError) -> Self {
        Self::Gateway {
            kind: err.kind(),
            message: err.message().to_string(),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
