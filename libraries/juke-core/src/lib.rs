//! Juke Core
//!
//! Platform-agnostic types and collaborator contracts for remote playback.
//!
//! The playback session lives on a streaming provider (Spotify and friends).
//! Clients hold a mirror of it and drive it through a backend API. This crate
//! holds what every layer of that mirror agrees on:
//!
//! - **Domain Types**: `PlaybackState`, `Track`, `Device`, `ControlRequest`
//! - **Contracts**: `RemoteControlGateway` (one async call per control verb)
//!   and `SessionSource` (the injected auth token source)
//! - **Error Handling**: `GatewayError` and its `Result` alias
//!
//! # Example
//!
//! ```rust
//! use juke_core::{ControlRequest, ProviderName, Track};
//!
//! let provider = ProviderName::spotify();
//! let track = Track::new("4uLU6hMCjMI75M1A2tKUQC", "Never Gonna Give You Up");
//!
//! // A bare id is enough to derive the canonical URI.
//! let uri = track.playable_uri(&provider).unwrap();
//! assert_eq!(uri, "spotify:track:4uLU6hMCjMI75M1A2tKUQC");
//!
//! let request = ControlRequest::for_track(provider, uri, None);
//! assert!(matches!(request, ControlRequest::Track { .. }));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{GatewayError, GatewayErrorKind, Result};
pub use traits::{RemoteControlGateway, SessionSource};

#[cfg(any(test, feature = "mocks"))]
pub use traits::MockRemoteControlGateway;

pub use types::{
    clamp_progress, Album, Artist, ControlRequest, Device, PlaybackState, ProviderName, Track,
};
