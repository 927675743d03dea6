//! One-shot and long-running CLI commands over a `PlaybackEngine`

use crate::error::Result;
use juke_core::{Device, ProviderName, Track};
use juke_playback::{
    PlayContextOptions, PlayTrackOptions, PlaybackEngine, PlaybackErrorKind, PlaybackEvent,
    PlaybackSnapshot, StateOrigin,
};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// Extra time allowed for the settle refresh to come back
const SETTLE_GRACE: Duration = Duration::from_secs(15);

/// A single playback command
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Print the current session
    Status,
    /// Play a track given as a URI or a bare provider id
    Play {
        track: String,
        context_uri: Option<String>,
        provider: Option<ProviderName>,
    },
    /// Play an album, artist or playlist from its start
    PlayContext {
        context_uri: String,
        provider: Option<ProviderName>,
    },
    Pause,
    Resume,
    Next,
    Previous,
    /// Seek to a position in milliseconds
    Seek { position_ms: f64 },
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Play { .. } => "play",
            Self::PlayContext { .. } => "play-context",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Seek { .. } => "seek",
        }
    }
}

/// Printable view of the engine after a command
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub provider: String,
    pub is_playing: bool,
    pub progress_ms: u64,
    pub duration_ms: Option<u64>,
    pub track: Option<Track>,
    pub device: Option<Device>,
    pub can_control: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: PlaybackErrorKind,
    pub message: String,
}

impl From<&PlaybackSnapshot> for StatusReport {
    fn from(snapshot: &PlaybackSnapshot) -> Self {
        let state = snapshot.state.as_ref();
        Self {
            provider: state
                .map_or(&snapshot.provider, |s| &s.provider)
                .to_string(),
            is_playing: snapshot.is_playing(),
            progress_ms: snapshot.progress_ms(),
            duration_ms: snapshot.duration_ms(),
            track: state.and_then(|s| s.track.clone()),
            device: state.and_then(|s| s.device.clone()),
            can_control: snapshot.can_control,
            error: snapshot.error.as_ref().map(|e| ErrorReport {
                kind: e.kind(),
                message: e.to_string(),
            }),
        }
    }
}

/// Track built from CLI input. Anything with a `:` is taken as a full URI.
pub fn track_from_arg(arg: &str) -> Track {
    let arg = arg.trim();
    if arg.contains(':') {
        let id = arg.rsplit(':').next().unwrap_or_default();
        Track::new(id, "").with_uri(arg)
    } else {
        Track::new(arg, "")
    }
}

/// Run one command and report the state it settled on.
///
/// The session is fetched first so controls target the active device. After a
/// successful control the settle refresh is awaited so the report reflects
/// the provider rather than the local guess.
pub async fn run_once(engine: &PlaybackEngine, action: Action) -> Result<StatusReport> {
    if let Err(err) = engine.refresh().await {
        if action == Action::Status {
            return Err(err.into());
        }
        warn!(error = %err, "Could not read the current session, continuing");
    }

    if action == Action::Status {
        return Ok(StatusReport::from(&engine.snapshot()));
    }

    let name = action.name();
    let mut events = engine.events();

    match action {
        Action::Status => {}
        Action::Play {
            track,
            context_uri,
            provider,
        } => {
            let options = PlayTrackOptions {
                provider,
                context_uri,
            };
            engine.play_track(&track_from_arg(&track), options).await?;
        }
        Action::PlayContext {
            context_uri,
            provider,
        } => {
            engine
                .play_context(&context_uri, PlayContextOptions { provider })
                .await?;
        }
        Action::Pause => engine.pause().await?,
        Action::Resume => engine.resume().await?,
        Action::Next => engine.next().await?,
        Action::Previous => engine.previous().await?,
        Action::Seek { position_ms } => engine.seek(position_ms).await?,
    }

    info!(command = name, "Playback command accepted");

    let limit = engine.config().settle_delay() + SETTLE_GRACE;
    match tokio::time::timeout(limit, wait_for_settle(&mut events)).await {
        Ok(true) => debug!(command = name, "Settle refresh finished"),
        Ok(false) => debug!("Event stream closed before the settle refresh"),
        Err(_) => warn!(command = name, "Timed out waiting for the settle refresh"),
    }

    Ok(StatusReport::from(&engine.snapshot()))
}

/// Wait for the next provider refresh to land, be discarded, or fail
async fn wait_for_settle(events: &mut broadcast::Receiver<PlaybackEvent>) -> bool {
    loop {
        match events.recv().await {
            Ok(PlaybackEvent::StateReplaced {
                origin: StateOrigin::Reconciled,
            })
            | Ok(PlaybackEvent::ResponseDiscarded {
                origin: StateOrigin::Reconciled,
            })
            | Ok(PlaybackEvent::ErrorRaised { .. }) => return true,
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "Event receiver lagged");
            }
            Err(RecvError::Closed) => return false,
        }
    }
}

/// Follow the session and log track and play/pause changes until `shutdown`
pub async fn watch<F>(engine: &PlaybackEngine, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let mut events = engine.events();
    if let Err(err) = engine.start().await {
        warn!(error = %err, "Initial refresh failed, polling continues");
    }
    log_status(&engine.snapshot());

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            () = &mut shutdown => break,
            event = events.recv() => match event {
                Ok(PlaybackEvent::TrackChanged { .. }) => log_status(&engine.snapshot()),
                Ok(PlaybackEvent::PlayingChanged { is_playing }) => {
                    info!(is_playing, "Playback {}", if is_playing { "resumed" } else { "paused" });
                }
                Ok(PlaybackEvent::ErrorRaised { kind, message }) => {
                    warn!(%kind, "{}", message);
                }
                Ok(PlaybackEvent::SessionEnded) => info!("Session ended"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Event receiver lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    engine.shutdown();
    Ok(())
}

fn log_status(snapshot: &PlaybackSnapshot) {
    match snapshot.state.as_ref().and_then(|s| s.track.as_ref()) {
        Some(track) => info!(
            track_uri = ?snapshot.active_track_uri(),
            is_playing = snapshot.is_playing(),
            "Now: {} - {}",
            track.name,
            track.artist_line()
        ),
        None => info!("Nothing playing"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juke_core::PlaybackState;

    #[test]
    fn track_arg_accepts_uri_or_id() {
        let track = track_from_arg("spotify:track:abc");
        assert_eq!(track.id, "abc");
        assert_eq!(track.uri.as_deref(), Some("spotify:track:abc"));

        let track = track_from_arg(" abc ");
        assert_eq!(track.id, "abc");
        assert_eq!(
            track.playable_uri(&ProviderName::spotify()).as_deref(),
            Some("spotify:track:abc")
        );
    }

    #[test]
    fn report_prefers_state_provider() {
        let mut state = PlaybackState::idle(ProviderName::new("deezer"));
        state.progress_ms = 1_500;
        let snapshot = PlaybackSnapshot {
            state: Some(state),
            provider: ProviderName::spotify(),
            error: None,
            is_busy: false,
            can_control: true,
        };

        let report = StatusReport::from(&snapshot);
        assert_eq!(report.provider, "deezer");
        assert_eq!(report.progress_ms, 1_500);
        assert!(report.error.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("error").is_none());
    }
}
