//! Juke - Remote Playback Synchronization
//!
//! Keeps a local mirror of a playback session that lives on a streaming
//! provider, and drives that session from the client.
//!
//! This crate provides:
//! - A single owner of the live `PlaybackState` (`PlaybackEngine`)
//! - Optimistic play actions with rollback on failure
//! - An identity guard so late responses for a superseded track are dropped
//! - Local progress simulation between polls (1s ticker)
//! - Adaptive reconciliation polling (6s playing, 12s idle) plus a settle
//!   refresh after every successful control call
//! - Catch-up refreshes on focus and visibility regain
//! - A scrub controller that collapses a whole drag into one seek
//!
//! # Architecture
//!
//! `juke-playback` knows nothing about HTTP or UI toolkits:
//! - Network calls go through `juke_core::RemoteControlGateway`
//! - Auth comes from an injected `juke_core::SessionSource`
//! - UIs read `PlaybackSnapshot`s from a watch channel and may listen to
//!   `PlaybackEvent`s on a broadcast channel
//!
//! All timers are tokio tasks owned by the engine. They are torn down together
//! on sign-out and restarted on sign-in.
//!
//! # Example: Controlling Playback
//!
//! ```rust,no_run
//! use juke_core::{RemoteControlGateway, Track};
//! use juke_playback::{PlayTrackOptions, PlaybackEngine, SessionStore, SyncConfig};
//! use std::sync::Arc;
//!
//! # async fn demo(gateway: Arc<dyn RemoteControlGateway>) -> juke_playback::Result<()> {
//! let session = Arc::new(SessionStore::with_token("token"));
//! let engine = PlaybackEngine::new(gateway, session.clone(), SyncConfig::default());
//! engine.follow_session(&session);
//! engine.start().await?;
//!
//! let track = Track::new("4uLU6hMCjMI75M1A2tKUQC", "Never Gonna Give You Up")
//!     .with_duration_ms(213_573);
//! engine
//!     .play_track(&track, PlayTrackOptions::in_context("spotify:album:6N9PS4QXF1D0OWPk0Sxtb4"))
//!     .await?;
//! assert!(engine.is_playing());
//!
//! engine.seek(42_000.0).await?;
//! engine.pause().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Scrubbing
//!
//! ```rust,no_run
//! use juke_playback::{PlaybackEngine, ScrubController, ScrubKey};
//!
//! # async fn demo(engine: PlaybackEngine) -> juke_playback::Result<()> {
//! let mut scrub = ScrubController::new(engine);
//!
//! // Drag: any number of updates, one seek on release
//! scrub.begin();
//! scrub.update(30_000.0);
//! scrub.update(42_000.0);
//! scrub.release(None).await?;
//!
//! // Keyboard: each step commits
//! scrub.nudge(ScrubKey::ArrowRight).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod engine;
mod error;
mod events;
mod optimistic;
mod poller;
mod scrub;
mod session;
mod snapshot;
mod ticker;
pub mod types;

// Re-export main types
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, PlaybackErrorKind, Result};
pub use events::{PlaybackEvent, StateOrigin};
pub use scrub::{ScrubController, ScrubKey};
pub use session::SessionStore;
pub use snapshot::PlaybackSnapshot;
pub use types::{LifecycleEvent, PlayContextOptions, PlayTrackOptions, SyncConfig};
