/// Track metadata as reported by the provider
use super::ProviderName;
use serde::{Deserialize, Serialize};

/// Track artist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: Option<String>,
    pub uri: Option<String>,
    pub name: String,
}

/// Track album
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub uri: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
}

/// A provider track
///
/// `uri` is the canonical provider URI used for control calls. It is optional
/// here because loose payloads sometimes only carry an id; see
/// [`Track::playable_uri`] for how a control URI is derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub uri: Option<String>,
    pub name: String,
    /// Duration in milliseconds. `None` or `0` means unknown.
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<Album>,
}

impl Track {
    /// Create a track with an id and a name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the canonical URI
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the duration
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Duration if known and non-zero
    pub fn known_duration_ms(&self) -> Option<u64> {
        self.duration_ms.filter(|d| *d > 0)
    }

    /// URI usable for control calls.
    ///
    /// A non-blank `uri` wins. Otherwise a non-blank `id` becomes
    /// `{provider}:track:{id}`. Returns `None` when neither is present.
    pub fn playable_uri(&self, provider: &ProviderName) -> Option<String> {
        if let Some(uri) = self.uri.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            return Some(uri.to_string());
        }

        let id = self.id.trim();
        if id.is_empty() {
            None
        } else {
            Some(format!("{}:track:{}", provider, id))
        }
    }

    /// Artwork, falling back to the album's
    pub fn artwork(&self) -> Option<&str> {
        self.artwork_url
            .as_deref()
            .or_else(|| self.album.as_ref().and_then(|a| a.artwork_url.as_deref()))
    }

    /// Artist names joined for display
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
