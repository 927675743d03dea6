//! Shared fixtures for playback engine tests

#![allow(dead_code)]

use async_trait::async_trait;
use juke_core::{
    ControlRequest, Device, GatewayError, PlaybackState, ProviderName, RemoteControlGateway,
    Track,
};
use juke_playback::{PlaybackEngine, SessionStore, SyncConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

// ===== Recorded Calls =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch(ProviderName),
    Play(ControlRequest),
    Pause(ControlRequest),
    Next(ControlRequest),
    Previous(ControlRequest),
    Seek(ControlRequest),
}

// ===== Fake Gateway =====

/// Scripted gateway.
///
/// Responses are captured when a call starts, then the call waits on its gate.
/// That lets a test hold a call in flight and change the script meanwhile.
pub struct FakeGateway {
    calls: Mutex<Vec<Call>>,
    remote: Mutex<Option<PlaybackState>>,
    fetch_failure: Mutex<Option<GatewayError>>,
    control_failure: Mutex<Option<GatewayError>>,
    control_body: Mutex<Option<PlaybackState>>,
    next_fetch_delay: Mutex<Option<Duration>>,
    fetch_gate: watch::Sender<bool>,
    control_gate: watch::Sender<bool>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            remote: Mutex::new(None),
            fetch_failure: Mutex::new(None),
            control_failure: Mutex::new(None),
            control_body: Mutex::new(None),
            next_fetch_delay: Mutex::new(None),
            fetch_gate: watch::channel(true).0,
            control_gate: watch::channel(true).0,
        })
    }

    /// What `fetch_state` reports
    pub fn set_remote(&self, state: Option<PlaybackState>) {
        *self.remote.lock().unwrap() = state;
    }

    pub fn fail_fetches(&self, error: Option<GatewayError>) {
        *self.fetch_failure.lock().unwrap() = error;
    }

    pub fn fail_controls(&self, error: Option<GatewayError>) {
        *self.control_failure.lock().unwrap() = error;
    }

    /// Body returned by successful control calls
    pub fn respond_to_controls_with(&self, state: Option<PlaybackState>) {
        *self.control_body.lock().unwrap() = state;
    }

    /// Make only the next `fetch_state` take `delay` before it answers
    pub fn delay_next_fetch(&self, delay: Duration) {
        *self.next_fetch_delay.lock().unwrap() = Some(delay);
    }

    pub fn hold_fetches(&self) {
        self.fetch_gate.send_replace(false);
    }

    pub fn release_fetches(&self) {
        self.fetch_gate.send_replace(true);
    }

    pub fn hold_controls(&self) {
        self.control_gate.send_replace(false);
    }

    pub fn release_controls(&self) {
        self.control_gate.send_replace(true);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Fetch(_)))
            .count()
    }

    pub fn control_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Fetch(_)))
            .collect()
    }

    pub fn seek_positions(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Seek(ControlRequest::Seek { position_ms, .. }) => Some(position_ms),
                _ => None,
            })
            .collect()
    }

    async fn wait(gate: &watch::Sender<bool>) {
        let mut rx = gate.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }

    async fn control(&self, call: Call) -> juke_core::Result<Option<PlaybackState>> {
        self.calls.lock().unwrap().push(call);
        let response = match self.control_failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(self.control_body.lock().unwrap().clone()),
        };
        Self::wait(&self.control_gate).await;
        response
    }
}

#[async_trait]
impl RemoteControlGateway for FakeGateway {
    async fn fetch_state(
        &self,
        _auth_token: &str,
        provider: &ProviderName,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.calls.lock().unwrap().push(Call::Fetch(provider.clone()));
        let response = match self.fetch_failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(self.remote.lock().unwrap().clone()),
        };
        let delay = self.next_fetch_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Self::wait(&self.fetch_gate).await;
        response
    }

    async fn play(
        &self,
        _auth_token: &str,
        request: &ControlRequest,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.control(Call::Play(request.clone())).await
    }

    async fn pause(
        &self,
        _auth_token: &str,
        request: &ControlRequest,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.control(Call::Pause(request.clone())).await
    }

    async fn next(
        &self,
        _auth_token: &str,
        request: &ControlRequest,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.control(Call::Next(request.clone())).await
    }

    async fn previous(
        &self,
        _auth_token: &str,
        request: &ControlRequest,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.control(Call::Previous(request.clone())).await
    }

    async fn seek(
        &self,
        _auth_token: &str,
        request: &ControlRequest,
    ) -> juke_core::Result<Option<PlaybackState>> {
        self.control(Call::Seek(request.clone())).await
    }
}

// ===== Helper Functions =====

pub fn create_test_track(uri: &str, duration_ms: u64) -> Track {
    let id = uri.rsplit(':').next().unwrap_or(uri).to_string();
    Track::new(id, format!("Track {}", uri))
        .with_uri(uri)
        .with_duration_ms(duration_ms)
}

pub fn remote_state(uri: &str, progress_ms: u64, duration_ms: u64, is_playing: bool) -> PlaybackState {
    PlaybackState {
        is_playing,
        progress_ms,
        track: Some(create_test_track(uri, duration_ms)),
        device: Some(Device::new("device-1", "Living room")),
        ..PlaybackState::idle(ProviderName::spotify())
    }
}

pub fn gateway_error(message: &str) -> GatewayError {
    GatewayError::provider(502, message)
}

pub struct Harness {
    pub engine: PlaybackEngine,
    pub gateway: Arc<FakeGateway>,
    pub session: Arc<SessionStore>,
}

pub fn signed_in() -> Harness {
    harness(Some("test-token"))
}

pub fn signed_out() -> Harness {
    harness(None)
}

fn harness(token: Option<&str>) -> Harness {
    let gateway = FakeGateway::new();
    let session = Arc::new(match token {
        Some(token) => SessionStore::with_token(token),
        None => SessionStore::new(),
    });
    let engine = PlaybackEngine::new(gateway.clone(), session.clone(), SyncConfig::default());
    Harness {
        engine,
        gateway,
        session,
    }
}

/// Let the paused clock run forward, driving every timer due on the way
pub async fn advance_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Let spawned tasks run without moving the clock
pub async fn yield_to_tasks() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
