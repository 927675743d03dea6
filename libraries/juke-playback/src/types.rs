//! Core types for playback synchronization

use juke_core::ProviderName;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Synchronization timing configuration
///
/// Every field has a default, so a partial config file is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Provider used until the remote state names one (default: "spotify")
    pub default_provider: ProviderName,

    /// Delay before the extra refresh after a control call (default: 900ms)
    pub settle_delay_ms: u64,

    /// Poll interval while playing (default: 6s)
    pub poll_playing_ms: u64,

    /// Poll interval while idle or paused (default: 12s)
    pub poll_idle_ms: u64,

    /// Local progress tick period and increment (default: 1s)
    pub tick_ms: u64,

    /// How long an optimistic play guards against mismatching responses (default: 3s)
    pub intent_guard_ms: u64,

    /// Arrow-key scrub step (default: 1s)
    pub scrub_step_ms: u64,

    /// Capacity of the event broadcast channel (default: 64)
    pub event_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_provider: ProviderName::spotify(),
            settle_delay_ms: 900,
            poll_playing_ms: 6_000,
            poll_idle_ms: 12_000,
            tick_ms: 1_000,
            intent_guard_ms: 3_000,
            scrub_step_ms: 1_000,
            event_capacity: 64,
        }
    }
}

impl SyncConfig {
    /// Reject configurations that would spin timers
    pub fn validate(&self) -> Result<(), String> {
        if self.default_provider.as_str().trim().is_empty() {
            return Err("default_provider cannot be empty".to_string());
        }
        for (name, value) in [
            ("poll_playing_ms", self.poll_playing_ms),
            ("poll_idle_ms", self.poll_idle_ms),
            ("tick_ms", self.tick_ms),
        ] {
            if value == 0 {
                return Err(format!("{} must be greater than zero", name));
            }
        }
        if self.event_capacity == 0 {
            return Err("event_capacity must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Poll interval for the given playing flag
    pub fn poll_interval(&self, is_playing: bool) -> Duration {
        if is_playing {
            Duration::from_millis(self.poll_playing_ms)
        } else {
            Duration::from_millis(self.poll_idle_ms)
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn intent_guard(&self) -> Duration {
        Duration::from_millis(self.intent_guard_ms)
    }
}

/// Options for `PlaybackEngine::play_track`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayTrackOptions {
    /// Provider override; falls back to the current state's provider
    pub provider: Option<ProviderName>,

    /// Album/artist/playlist context to play the track within
    pub context_uri: Option<String>,
}

impl PlayTrackOptions {
    /// Play the track within `context_uri`
    pub fn in_context(context_uri: impl Into<String>) -> Self {
        Self {
            provider: None,
            context_uri: Some(context_uri.into()),
        }
    }
}

/// Options for `PlaybackEngine::play_context`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayContextOptions {
    pub provider: Option<ProviderName>,
}

/// Host lifecycle signals that should trigger a catch-up refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Window regained focus
    FocusGained,
    /// Page/app visibility changed
    VisibilityChanged { visible: bool },
}

impl LifecycleEvent {
    /// Whether this signal means the user is back and may see stale state
    pub fn is_regain(self) -> bool {
        match self {
            Self::FocusGained => true,
            Self::VisibilityChanged { visible } => visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.default_provider.as_str(), "spotify");
        assert_eq!(config.settle_delay(), Duration::from_millis(900));
        assert_eq!(config.poll_interval(true), Duration::from_secs(6));
        assert_eq!(config.poll_interval(false), Duration::from_secs(12));
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.scrub_step_ms, 1_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: SyncConfig =
            serde_json::from_str(r#"{"settle_delay_ms": 500, "default_provider": "deezer"}"#)
                .unwrap();
        assert_eq!(config.settle_delay_ms, 500);
        assert_eq!(config.default_provider.as_str(), "deezer");
        assert_eq!(config.poll_playing_ms, 6_000);
    }

    #[test]
    fn zero_periods_are_rejected() {
        let config = SyncConfig {
            tick_ms: 0,
            ..SyncConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("tick_ms"));

        let config = SyncConfig {
            poll_idle_ms: 0,
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn only_regain_signals_refresh() {
        assert!(LifecycleEvent::FocusGained.is_regain());
        assert!(LifecycleEvent::VisibilityChanged { visible: true }.is_regain());
        assert!(!LifecycleEvent::VisibilityChanged { visible: false }.is_regain());
    }
}
