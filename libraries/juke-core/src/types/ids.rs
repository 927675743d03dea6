/// Identifier types for remote playback
use serde::{Deserialize, Serialize};
use std::fmt;

/// Streaming provider identifier (e.g. "spotify")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderName(String);

impl ProviderName {
    /// Name of the built-in default provider
    pub const SPOTIFY: &'static str = "spotify";

    /// Create a provider name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The Spotify provider
    pub fn spotify() -> Self {
        Self(Self::SPOTIFY.to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProviderName {
    fn default() -> Self {
        Self::spotify()
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProviderName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProviderName {
    fn from(s: String) -> Self {
        Self(s)
    }
}
