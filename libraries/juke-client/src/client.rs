//! Main Juke backend client.

use crate::error::{ClientError, Result};
use crate::playback::PlaybackClient;
use crate::types::ClientConfig;
use async_trait::async_trait;
use juke_core::{ControlRequest, GatewayError, PlaybackState, ProviderName, RemoteControlGateway};
use reqwest::Client;
use tracing::info;
use url::Url;

/// Main client for the Juke backend.
///
/// Holds one pooled HTTP client. Auth tokens are passed per call, so a single
/// client can serve every session.
///
/// # Example
///
/// ```no_run
/// use juke_client::{ClientConfig, JukeClient};
/// use juke_core::ProviderName;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let client = JukeClient::new(ClientConfig::new("https://api.juke.example"))?;
///
/// let state = client
///     .playback()
///     .state("token", &ProviderName::spotify())
///     .await?;
/// println!("playing: {}", state.is_some_and(|s| s.is_playing));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JukeClient {
    http: Client,
    base_url: String,
}

impl JukeClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        // Validate URL
        if config.base_url.trim().is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("Juke/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        info!(base_url = %base_url, "Juke client ready");

        Ok(Self { http, base_url })
    }

    /// Get the normalized backend URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get a client for the playback endpoints.
    pub fn playback(&self) -> PlaybackClient<'_> {
        PlaybackClient::new(&self.http, &self.base_url)
    }
}

#[async_trait]
impl RemoteControlGateway for JukeClient {
    async fn fetch_state(
        &self,
        auth_token: &str,
        provider: &ProviderName,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.playback()
            .state(auth_token, provider)
            .await
            .map_err(GatewayError::from)
    }

    async fn play(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.playback()
            .play(auth_token, request)
            .await
            .map_err(GatewayError::from)
    }

    async fn pause(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.playback()
            .pause(auth_token, request)
            .await
            .map_err(GatewayError::from)
    }

    async fn next(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.playback()
            .next(auth_token, request)
            .await
            .map_err(GatewayError::from)
    }

    async fn previous(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.playback()
            .previous(auth_token, request)
            .await
            .map_err(GatewayError::from)
    }

    async fn seek(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.playback()
            .seek(auth_token, request)
            .await
            .map_err(GatewayError::from)
    }
}
