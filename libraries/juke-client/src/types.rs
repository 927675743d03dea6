//! Types for Juke backend playback requests and responses.
//!
//! Response DTOs are deliberately loose: every field is optional and both the
//! backend's snake_case and the mobile clients' camelCase spellings decode.
//! They are normalized into `juke_core` types here so nothing past this crate
//! sees provider-specific field names.

use chrono::{DateTime, Utc};
use juke_core::{Album, Artist, ControlRequest, Device, PlaybackState, ProviderName, Track};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for connecting to a Juke backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g., "https://api.juke.example")
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Create a config with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// JSON body for every control endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlBody<'a> {
    pub provider: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_ms: Option<u64>,
}

impl<'a> From<&'a ControlRequest> for ControlBody<'a> {
    fn from(request: &'a ControlRequest) -> Self {
        let empty = ControlBody {
            provider: request.provider().as_str(),
            track_uri: None,
            context_uri: None,
            offset_uri: None,
            device_id: request.device_id(),
            position_ms: None,
        };

        match request {
            ControlRequest::Track { track_uri, .. } => ControlBody {
                track_uri: Some(track_uri.as_str()),
                ..empty
            },
            ControlRequest::Context {
                context_uri,
                offset_uri,
                ..
            } => ControlBody {
                context_uri: Some(context_uri.as_str()),
                offset_uri: offset_uri.as_deref(),
                ..empty
            },
            ControlRequest::Transport { .. } => empty,
            ControlRequest::Seek { position_ms, .. } => ControlBody {
                position_ms: Some(*position_ms),
                ..empty
            },
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Playback state as returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StateResponse {
    pub provider: Option<String>,
    #[serde(alias = "isPlaying")]
    pub is_playing: Option<bool>,
    #[serde(alias = "progressMs")]
    pub progress_ms: Option<i64>,
    pub track: Option<TrackResponse>,
    pub device: Option<DeviceResponse>,
}

/// Track as returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackResponse {
    pub id: Option<String>,
    pub uri: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "durationMs")]
    pub duration_ms: Option<i64>,
    #[serde(alias = "artworkUrl")]
    pub artwork_url: Option<String>,
    pub artists: Option<Vec<ArtistResponse>>,
    pub album: Option<AlbumResponse>,
}

/// Track artist as returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArtistResponse {
    pub id: Option<String>,
    pub uri: Option<String>,
    pub name: Option<String>,
}

/// Album as returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlbumResponse {
    pub id: Option<String>,
    pub uri: Option<String>,
    pub name: Option<String>,
}

/// Output device as returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceResponse {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type", alias = "device_type")]
    pub device_type: Option<String>,
    #[serde(alias = "volumePercent")]
    pub volume_percent: Option<i64>,
    #[serde(alias = "isActive")]
    pub is_active: Option<bool>,
}

/// Error body. DRF puts the human-readable message in `detail`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorBody {
    /// `detail` as a display string, if it is one
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(detail)) if !detail.trim().is_empty() => {
                Some(detail.trim().to_string())
            }
            _ => None,
        }
    }
}

// =============================================================================
// Normalization
// =============================================================================

fn non_negative(value: i64) -> u64 {
    value.max(0) as u64
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl StateResponse {
    /// Normalize into a `PlaybackState`.
    ///
    /// `None` when the body does not describe a session (no provider or no
    /// playing flag). `received_at` becomes `updated_at`.
    pub fn into_state(self, received_at: DateTime<Utc>) -> Option<PlaybackState> {
        let provider = non_blank(self.provider)?;
        let is_playing = self.is_playing?;

        Some(
            PlaybackState {
                provider: ProviderName::new(provider),
                is_playing,
                progress_ms: self.progress_ms.map_or(0, non_negative),
                track: self.track.map(TrackResponse::into_track),
                device: self.device.map(DeviceResponse::into_device),
                updated_at: received_at,
            }
            .clamped(),
        )
    }
}

impl TrackResponse {
    fn into_track(self) -> Track {
        let album = self.album.map(|album| Album {
            id: album.id.unwrap_or_default(),
            uri: album.uri.unwrap_or_default(),
            name: album.name.unwrap_or_default(),
            artwork_url: None,
        });

        Track {
            id: self.id.unwrap_or_default(),
            uri: non_blank(self.uri),
            name: self.name.unwrap_or_default(),
            duration_ms: self.duration_ms.map(non_negative),
            artwork_url: non_blank(self.artwork_url),
            artists: self
                .artists
                .unwrap_or_default()
                .into_iter()
                .filter_map(|artist| {
                    Some(Artist {
                        name: non_blank(artist.name)?,
                        id: artist.id,
                        uri: artist.uri,
                    })
                })
                .collect(),
            album,
        }
    }
}

impl DeviceResponse {
    fn into_device(self) -> Device {
        Device {
            id: non_blank(self.id),
            name: self.name,
            device_type: self.device_type,
            volume_percent: self.volume_percent.map(|v| v.clamp(0, 100) as u8),
            is_active: self.is_active.unwrap_or(false),
        }
    }
}
