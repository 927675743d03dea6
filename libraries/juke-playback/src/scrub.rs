//! Scrub controller
//!
//! Buffers drag and keyboard scrub input so the position indicator is not
//! yanked around by ticks or polls mid-drag. The buffered value never touches
//! the engine's state; only a commit reaches it, as exactly one seek.

use crate::engine::PlaybackEngine;
use crate::error::Result;
use crate::snapshot::PlaybackSnapshot;
use juke_core::clamp_progress;
use tracing::debug;

/// Discrete keyboard steps on the scrub bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubKey {
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
}

impl ScrubKey {
    /// Parse a DOM-style key name
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            "PageUp" => Some(Self::PageUp),
            "PageDown" => Some(Self::PageDown),
            "Home" => Some(Self::Home),
            "End" => Some(Self::End),
            _ => None,
        }
    }
}

/// In-progress scrub, keyed by the track it refers to
#[derive(Debug, Clone, PartialEq)]
struct Scrub {
    track_uri: String,
    value_ms: f64,
}

/// Drag/keyboard scrub state machine: `idle -> scrubbing -> idle`
pub struct ScrubController {
    engine: PlaybackEngine,
    scrub: Option<Scrub>,
}

impl ScrubController {
    pub fn new(engine: PlaybackEngine) -> Self {
        Self {
            engine,
            scrub: None,
        }
    }

    /// Drop a scrub that refers to a track that is no longer loaded
    fn active(&mut self, snapshot: &PlaybackSnapshot) -> Option<&Scrub> {
        let track_uri = snapshot.active_track_uri();
        let stale = self
            .scrub
            .as_ref()
            .is_some_and(|s| Some(s.track_uri.as_str()) != track_uri.as_deref());
        if stale {
            debug!("Track changed mid-scrub, discarding scrub");
            self.scrub = None;
        }
        self.scrub.as_ref()
    }

    fn enabled_for(snapshot: &PlaybackSnapshot) -> bool {
        snapshot.can_control
            && snapshot.has_track()
            && !snapshot.is_busy
            && snapshot.duration_ms().is_some()
    }

    /// Whether scrubbing is allowed right now
    pub fn is_enabled(&self) -> bool {
        Self::enabled_for(&self.engine.snapshot())
    }

    pub fn is_scrubbing(&mut self) -> bool {
        let snapshot = self.engine.snapshot();
        self.active(&snapshot).is_some()
    }

    /// Pointer down: start scrubbing from the displayed position
    pub fn begin(&mut self) -> bool {
        let snapshot = self.engine.snapshot();
        if !Self::enabled_for(&snapshot) {
            return false;
        }
        let Some(track_uri) = snapshot.active_track_uri() else {
            return false;
        };
        self.scrub = Some(Scrub {
            track_uri,
            value_ms: snapshot.progress_ms() as f64,
        });
        true
    }

    /// Drag input. Starts a scrub if none is active. Non-finite input is ignored.
    pub fn update(&mut self, value_ms: f64) {
        if !value_ms.is_finite() {
            return;
        }
        let snapshot = self.engine.snapshot();
        if !Self::enabled_for(&snapshot) {
            return;
        }
        let Some(track_uri) = snapshot.active_track_uri() else {
            return;
        };
        self.scrub = Some(Scrub {
            track_uri,
            value_ms,
        });
    }

    /// Position to draw: the scrub value while scrubbing, else live progress
    pub fn display_position_ms(&mut self) -> u64 {
        let snapshot = self.engine.snapshot();
        let Some(duration) = snapshot.duration_ms() else {
            return 0;
        };
        match self.active(&snapshot) {
            Some(scrub) => bound(scrub.value_ms, duration),
            None => clamp_progress(snapshot.progress_ms(), Some(duration)),
        }
    }

    /// Displayed position as a whole percentage of the duration
    pub fn progress_percent(&mut self) -> u8 {
        let displayed = self.display_position_ms();
        match self.engine.snapshot().duration_ms() {
            Some(duration) => {
                let percent = (displayed as f64 / duration as f64 * 100.0).round();
                percent.min(100.0) as u8
            }
            None => 0,
        }
    }

    /// Abandon the scrub without seeking
    pub fn cancel(&mut self) {
        self.scrub = None;
    }

    /// Pointer up: commit `value_ms`, or the buffered value if none is given.
    ///
    /// Returns the committed position, or `None` if nothing was committed.
    /// A drag whose track changed underneath it is dropped, value and all.
    pub async fn release(&mut self, value_ms: Option<f64>) -> Result<Option<u64>> {
        let snapshot = self.engine.snapshot();
        let was_scrubbing = self.scrub.is_some();
        let buffered = self.active(&snapshot).map(|s| s.value_ms);
        if was_scrubbing && buffered.is_none() {
            return Ok(None);
        }
        let value = value_ms.filter(|v| v.is_finite()).or(buffered);
        self.commit(&snapshot, value).await
    }

    /// Keyboard step: move from the current position and commit immediately
    pub async fn nudge(&mut self, key: ScrubKey) -> Result<Option<u64>> {
        let snapshot = self.engine.snapshot();
        let Some(duration) = snapshot.duration_ms() else {
            self.scrub = None;
            return Ok(None);
        };
        if !Self::enabled_for(&snapshot) {
            return Ok(None);
        }

        let from = self
            .active(&snapshot)
            .map_or(snapshot.progress_ms() as f64, |s| s.value_ms);
        let step = self.engine.config().scrub_step_ms as f64;
        let page = (duration as f64 / 10.0).max(step);
        let target = match key {
            ScrubKey::ArrowLeft => from - step,
            ScrubKey::ArrowRight => from + step,
            ScrubKey::PageDown => from - page,
            ScrubKey::PageUp => from + page,
            ScrubKey::Home => 0.0,
            ScrubKey::End => duration as f64,
        };
        self.commit(&snapshot, Some(target)).await
    }

    async fn commit(
        &mut self,
        snapshot: &PlaybackSnapshot,
        value_ms: Option<f64>,
    ) -> Result<Option<u64>> {
        self.scrub = None;
        if !Self::enabled_for(snapshot) {
            return Ok(None);
        }

        let (Some(value), Some(duration)) = (value_ms, snapshot.duration_ms()) else {
            return Ok(None);
        };

        let position = bound(value, duration);
        debug!(position_ms = position, "Committing scrub");
        self.engine.seek(position as f64).await?;
        Ok(Some(position))
    }
}

fn bound(value_ms: f64, duration_ms: u64) -> u64 {
    value_ms.clamp(0.0, duration_ms as f64).round() as u64
}
