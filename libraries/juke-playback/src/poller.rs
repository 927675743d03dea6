//! Reconciliation poller
//!
//! Re-fetches ground truth on an interval that depends on the playing flag.
//! The engine pings `cadence` whenever that flag flips, which restarts the wait
//! with the new interval.

use crate::engine::{spawn_task, EngineCore};
use std::sync::{Arc, Weak};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

pub(crate) fn spawn(core: Weak<EngineCore>, cadence: Arc<Notify>) -> Option<JoinHandle<()>> {
    spawn_task(async move {
        loop {
            let Some(period) = core.upgrade().map(|c| c.poll_interval()) else {
                break;
            };
            trace!(period_ms = period.as_millis() as u64, "Next reconciliation poll");

            tokio::select! {
                () = tokio::time::sleep(period) => {
                    let Some(core) = core.upgrade() else {
                        break;
                    };
                    if let Err(err) = core.refresh().await {
                        // Already surfaced through the snapshot
                        debug!(error = %err, "Reconciliation poll failed");
                    }
                }
                () = cadence.notified() => {
                    trace!("Poll cadence changed");
                }
            }
        }
    })
}
