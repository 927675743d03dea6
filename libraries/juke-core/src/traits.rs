/// Collaborator contracts consumed by the playback engine
use crate::error::Result;
use crate::types::{ControlRequest, PlaybackState, ProviderName};
use async_trait::async_trait;

/// Remote playback control gateway
///
/// One async call per control verb. Every call either returns a snapshot of the
/// provider's playback session or fails with a classified `GatewayError`.
///
/// `Ok(None)` is not an error: it means the provider confirmed that nothing is
/// playing (no active device or session).
///
/// Implementations normalize whatever wire shape they receive into
/// `PlaybackState` before returning, so callers never see provider-specific
/// field names.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait RemoteControlGateway: Send + Sync {
    /// Fetch the current playback state for `provider`
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success response
    async fn fetch_state(
        &self,
        auth_token: &str,
        provider: &ProviderName,
    ) -> Result<Option<PlaybackState>>;

    /// Start playback of a track or a context
    async fn play(&self, auth_token: &str, request: &ControlRequest)
        -> Result<Option<PlaybackState>>;

    /// Pause playback
    async fn pause(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> Result<Option<PlaybackState>>;

    /// Skip to the next item
    async fn next(&self, auth_token: &str, request: &ControlRequest)
        -> Result<Option<PlaybackState>>;

    /// Go back to the previous item
    async fn previous(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> Result<Option<PlaybackState>>;

    /// Seek within the current item
    async fn seek(&self, auth_token: &str, request: &ControlRequest)
        -> Result<Option<PlaybackState>>;
}

/// Session token source
///
/// The engine never reads ambient credentials. Whoever owns sign-in hands it an
/// implementation of this trait instead.
pub trait SessionSource: Send + Sync {
    /// Current auth token, if signed in
    fn auth_token(&self) -> Option<String>;

    /// Whether a session exists
    fn is_authenticated(&self) -> bool {
        self.auth_token().is_some()
    }
}
