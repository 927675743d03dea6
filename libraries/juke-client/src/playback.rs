//! Playback endpoints of the Juke backend.

use crate::error::{ClientError, Result};
use crate::types::{ApiErrorBody, ControlBody, StateResponse};
use chrono::Utc;
use juke_core::{ControlRequest, PlaybackState, ProviderName};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

const STATE_PATH: &str = "/api/v1/playback/state/";

/// Playback client for the Juke backend.
///
/// Every call returns `Ok(None)` when the backend confirms there is no active
/// playback session.
pub struct PlaybackClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> PlaybackClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Get the current playback state for `provider`.
    pub async fn state(
        &self,
        auth_token: &str,
        provider: &ProviderName,
    ) -> Result<Option<PlaybackState>> {
        let url = format!("{}{}", self.base_url, STATE_PATH);
        debug!(url = %url, provider = %provider, "Fetching playback state");

        let request = self
            .http
            .get(&url)
            .query(&[("provider", provider.as_str())]);
        self.send(request, auth_token).await
    }

    /// Start or resume playback.
    pub async fn play(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> Result<Option<PlaybackState>> {
        self.control("play", auth_token, request).await
    }

    /// Pause playback.
    pub async fn pause(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> Result<Option<PlaybackState>> {
        self.control("pause", auth_token, request).await
    }

    /// Skip to the next track.
    pub async fn next(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> Result<Option<PlaybackState>> {
        self.control("next", auth_token, request).await
    }

    /// Go back to the previous track.
    pub async fn previous(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> Result<Option<PlaybackState>> {
        self.control("previous", auth_token, request).await
    }

    /// Seek within the current track.
    pub async fn seek(
        &self,
        auth_token: &str,
        request: &ControlRequest,
    ) -> Result<Option<PlaybackState>> {
        self.control("seek", auth_token, request).await
    }

    async fn control(
        &self,
        action: &str,
        auth_token: &str,
        request: &ControlRequest,
    ) -> Result<Option<PlaybackState>> {
        let url = format!("{}/api/v1/playback/{}/", self.base_url, action);
        let body = ControlBody::from(request);
        debug!(url = %url, provider = %body.provider, "Sending playback control");

        let request = self.http.post(&url).json(&body);
        self.send(request, auth_token).await
    }

    async fn send(
        &self,
        request: RequestBuilder,
        auth_token: &str,
    ) -> Result<Option<PlaybackState>> {
        let response = request
            .header(AUTHORIZATION, format!("Token {}", auth_token))
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        if response.status().is_success() {
            read_state(response).await
        } else {
            Err(error_for(response).await)
        }
    }
}

/// Decode a success response. No content means no active session.
async fn read_state(response: Response) -> Result<Option<PlaybackState>> {
    if response.status() == StatusCode::NO_CONTENT {
        debug!("No active playback session");
        return Ok(None);
    }

    let text = response.text().await.map_err(ClientError::from_transport)?;
    if text.trim().is_empty() {
        debug!("No active playback session");
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
        ClientError::ParseError(format!("Failed to parse playback state: {}", e))
    })?;
    if value.is_null() {
        return Ok(None);
    }

    let dto: StateResponse = serde_json::from_value(value).map_err(|e| {
        ClientError::ParseError(format!("Failed to parse playback state: {}", e))
    })?;
    Ok(dto.into_state(Utc::now()))
}

/// Classify a non-success response, preferring the backend's `detail` message
async fn error_for(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .and_then(|body| body.message())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Playback request failed")
                .to_string()
        });

    warn!(status = status.as_u16(), error = %message, "Playback request rejected");

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
        StatusCode::BAD_REQUEST if mentions_linking(&message) => {
            ClientError::ProviderNotLinked(message)
        }
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

fn mentions_linking(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("link") || message.contains("connect")
}
