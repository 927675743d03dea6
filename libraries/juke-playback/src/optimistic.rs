//! Optimistic play actions
//!
//! Every play action follows the same contract:
//! 1. capture the previous state
//! 2. apply the guessed next state and record what was asked for
//! 3. call the gateway
//! 4. on success keep the guess and let the settle refresh correct it;
//!    on failure put the previous state back and surface the error
//!
//! The recorded intent also acts as an identity guard:
//! - a response requested before the latest optimistic write is always dropped,
//!   however late it lands
//! - a response requested after it is dropped unless it shows the requested
//!   track, until one does or the guard window runs out

use crate::engine::{ControlVerb, EngineCore};
use crate::error::{PlaybackError, Result};
use crate::events::StateOrigin;
use chrono::Utc;
use juke_core::{ControlRequest, PlaybackState, ProviderName, Track};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// What an optimistic action asked the provider to play
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IntentTarget {
    /// A specific track URI
    Track(String),
    /// A context with no known first track
    Context,
}

#[derive(Debug, Clone)]
struct PendingIntent {
    provider: ProviderName,
    target: IntentTarget,
    issued_at: Instant,
}

impl PendingIntent {
    fn matches(&self, incoming: Option<&PlaybackState>) -> bool {
        let Some(state) = incoming else {
            return false;
        };
        let (provider, track_uri) = state.identity();
        if *provider != self.provider {
            return false;
        }
        match &self.target {
            IntentTarget::Track(uri) => track_uri.as_deref() == Some(uri.as_str()),
            IntentTarget::Context => state.is_playing,
        }
    }
}

/// Identity guard for the latest optimistic action
#[derive(Debug, Default)]
pub(crate) struct IntentGuard {
    pending: Option<PendingIntent>,
    epoch: u64,
}

impl IntentGuard {
    /// Record a new intent, superseding any previous one
    pub(crate) fn begin(&mut self, provider: ProviderName, target: IntentTarget, now: Instant) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        self.pending = Some(PendingIntent {
            provider,
            target,
            issued_at: now,
        });
        self.epoch
    }

    /// Whether `epoch` is still the latest intent
    pub(crate) fn is_latest(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Write generation to stamp on a request before it is sent
    pub(crate) fn generation(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn clear(&mut self) {
        self.pending = None;
    }

    /// Decide whether `incoming`, requested at `generation`, may replace the state.
    ///
    /// Anything requested before the latest optimistic write is rejected. For
    /// newer requests a match or an expired window releases the guard.
    pub(crate) fn admit(
        &mut self,
        incoming: Option<&PlaybackState>,
        generation: u64,
        window: Duration,
        now: Instant,
    ) -> bool {
        if generation != self.epoch {
            return false;
        }
        let Some(pending) = &self.pending else {
            return true;
        };

        let expired = now.saturating_duration_since(pending.issued_at) >= window;
        if expired || pending.matches(incoming) {
            self.pending = None;
            return true;
        }
        false
    }
}

/// Guess for a play action: playing from 0 on the current device
pub(crate) fn started_playing(
    provider: ProviderName,
    track: Option<Track>,
) -> impl FnOnce(Option<&PlaybackState>) -> PlaybackState + Send {
    move |previous| PlaybackState {
        provider,
        is_playing: true,
        progress_ms: 0,
        track,
        device: previous.and_then(|s| s.device.clone()),
        updated_at: Utc::now(),
    }
}

impl EngineCore {
    pub(crate) async fn run_optimistic<F>(
        &self,
        auth_token: &str,
        verb: ControlVerb,
        request: ControlRequest,
        target: IntentTarget,
        guess: F,
    ) -> Result<()>
    where
        F: FnOnce(Option<&PlaybackState>) -> PlaybackState + Send,
    {
        let (previous, intent_epoch, session_epoch) = {
            let mut store = self.lock_store();
            let previous = store.state.clone();
            let next = guess(previous.as_ref());
            let intent_epoch = store
                .intent
                .begin(next.provider.clone(), target, Instant::now());
            store.error = None;
            self.begin_busy(&mut store);
            self.assign(&mut store, Some(next), StateOrigin::Optimistic);
            (previous, intent_epoch, store.session_epoch)
        };

        info!(
            verb = verb.as_str(),
            provider = %request.provider(),
            "Sending playback control optimistically"
        );
        // The response body lags the device; the settle refresh corrects the guess
        let result = verb.call(self.gateway.as_ref(), auth_token, &request).await;

        {
            let mut store = self.lock_store();
            self.end_busy(&mut store, session_epoch);
            let current = store.session_epoch == session_epoch;

            if let Err(err) = result {
                let error = PlaybackError::from(err);
                if current {
                    if store.intent.is_latest(intent_epoch) {
                        warn!(error = %error, "Playback control failed, rolling back");
                        store.intent.clear();
                        self.assign(&mut store, previous, StateOrigin::Rollback);
                    } else {
                        warn!(error = %error, "Superseded playback control failed");
                    }
                    self.surface_error(&mut store, error.clone());
                }
                self.publish(&store);
                return Err(error);
            }

            self.publish(&store);
            if !current {
                return Ok(());
            }
        }

        self.schedule_settle_refresh();
        Ok(())
    }
}
