/// Control requests sent through the gateway
use super::ProviderName;

/// Body of a control call.
///
/// Bare-track and context forms start playback; the transport form covers
/// pause, resume, next and previous; seek carries a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    /// Play a single track
    Track {
        provider: ProviderName,
        track_uri: String,
    },

    /// Play an album/artist/playlist context, optionally starting at a track
    Context {
        provider: ProviderName,
        context_uri: String,
        offset_uri: Option<String>,
    },

    /// Pause, resume, next or previous on the given device
    Transport {
        provider: ProviderName,
        device_id: Option<String>,
    },

    /// Seek to a position on the given device
    Seek {
        provider: ProviderName,
        device_id: Option<String>,
        position_ms: u64,
    },
}

impl ControlRequest {
    /// Build a play request for `track_uri`.
    ///
    /// With a non-blank `context_uri` the track is played inside that context
    /// (the track becomes the offset). Otherwise the bare track is played.
    pub fn for_track(
        provider: ProviderName,
        track_uri: impl Into<String>,
        context_uri: Option<&str>,
    ) -> Self {
        let track_uri = track_uri.into();
        match context_uri.map(str::trim).filter(|c| !c.is_empty()) {
            Some(context) => Self::Context {
                provider,
                context_uri: context.to_string(),
                offset_uri: Some(track_uri),
            },
            None => Self::Track {
                provider,
                track_uri,
            },
        }
    }

    /// Play a context from its start
    pub fn context(provider: ProviderName, context_uri: impl Into<String>) -> Self {
        Self::Context {
            provider,
            context_uri: context_uri.into(),
            offset_uri: None,
        }
    }

    /// Pause/resume/next/previous request
    pub fn transport(provider: ProviderName, device_id: Option<String>) -> Self {
        Self::Transport {
            provider,
            device_id,
        }
    }

    /// Seek request
    pub fn seek(provider: ProviderName, device_id: Option<String>, position_ms: u64) -> Self {
        Self::Seek {
            provider,
            device_id,
            position_ms,
        }
    }

    /// Provider this request targets
    pub fn provider(&self) -> &ProviderName {
        match self {
            Self::Track { provider, .. }
            | Self::Context { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Seek { provider, .. } => provider,
        }
    }

    /// Target device, if any
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::Transport { device_id, .. } | Self::Seek { device_id, .. } => {
                device_id.as_deref()
            }
            Self::Track { .. } | Self::Context { .. } => None,
        }
    }
}
