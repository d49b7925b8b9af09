//! Background rescoring.
//!
//! Scores change with time waited, so a queue left alone drifts out of date. The loop
//! calls [`AdmissionScheduler::rescore`] on a fixed interval until stopped. A failed pass
//! is logged and retried on the next tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::time::MissedTickBehavior;

use crate::core::{AdmissionScheduler, AdmissionStore};
use crate::runtime::tokio_spawner::Spawn;
use crate::util::clock::Clock;

/// Handle to a running rescore loop.
#[derive(Debug)]
pub struct RescoreHandle {
    shutdown: watch::Sender<bool>,
    stopped: oneshot::Receiver<u64>,
    passes: Arc<AtomicU64>,
}

impl RescoreHandle {
    /// Successful passes so far.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }

    /// Stop the loop and wait for it to exit. Returns the number of successful passes.
    pub async fn stop(self) -> u64 {
        let _ = self.shutdown.send(true);
        self.stopped
            .await
            .unwrap_or_else(|_| self.passes.load(Ordering::Relaxed))
    }
}

/// Spawn a loop that rescores `scheduler` every `period` using `clock` for "now".
pub fn spawn_rescore_loop<S, C, Sp>(
    spawner: &Sp,
    scheduler: Arc<AdmissionScheduler<S>>,
    clock: C,
    period: Duration,
) -> RescoreHandle
where
    S: AdmissionStore + 'static,
    C: Clock + 'static,
    Sp: Spawn,
{
    let (shutdown, mut shutdown_rx) = watch::channel(false);
    let (stopped_tx, stopped) = oneshot::channel();
    let passes = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&passes);

    spawner.spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(period_ms = period.as_millis(), "rescore loop started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match scheduler.rescore(clock.now_ms()) {
                        Ok(waiting) => {
                            counter.fetch_add(1, Ordering::Relaxed);
                            tracing::debug!(waiting, "rescore pass");
                        }
                        Err(e) => tracing::warn!(error = %e, "rescore pass failed"),
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        let total = counter.load(Ordering::Relaxed);
        tracing::info!(passes = total, "rescore loop stopped");
        let _ = stopped_tx.send(total);
    });

    RescoreHandle {
        shutdown,
        stopped,
        passes,
    }
}
