//! Juke Backend Client
//!
//! HTTP client for the Juke backend playback API, and the production
//! implementation of `juke_core::RemoteControlGateway`.
//!
//! # Features
//!
//! - **State**: fetch the provider's current playback session
//! - **Control**: play (track, context or resume), pause, next, previous, seek
//! - **Normalization**: loose backend/mobile JSON shapes become `PlaybackState`
//!   at this boundary
//!
//! # Example
//!
//! ```no_run
//! use juke_client::{ClientConfig, JukeClient};
//! use juke_core::{ControlRequest, ProviderName, RemoteControlGateway};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = JukeClient::new(ClientConfig::new("https://api.juke.example"))?;
//!
//! let request = ControlRequest::for_track(
//!     ProviderName::spotify(),
//!     "spotify:track:4uLU6hMCjMI75M1A2tKUQC",
//!     None,
//! );
//! client.play("token", &request).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod playback;
mod types;

pub use client::JukeClient;
pub use error::{ClientError, Result};
pub use playback::PlaybackClient;
pub use types::{
    AlbumResponse, ApiErrorBody, ArtistResponse, ClientConfig, ControlBody, DeviceResponse,
    StateResponse, TrackResponse,
};
