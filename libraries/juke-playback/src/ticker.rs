//! Local progress ticker
//!
//! Simulates continuous progress between reconciliations. It keeps no counter
//! of its own: each tick reads whatever state is live and advances it, so a
//! reconciliation landing between ticks is simply picked up by the next one.

use crate::engine::{spawn_task, EngineCore};
use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

/// Start ticking every `period`. The first tick lands one period from now.
pub(crate) fn spawn(core: Weak<EngineCore>, period: Duration) -> Option<JoinHandle<()>> {
    spawn_task(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        // A suspended host should not fast-forward on wake
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let Some(core) = core.upgrade() else {
                break;
            };
            if !core.tick() {
                trace!("Ticker stopping, playback no longer playing");
                break;
            }
        }
    })
}
