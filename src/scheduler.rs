//! Debounced coalescing of attribute changes.
//!
//! Every request records its value (the last value per attribute wins) and
//! pushes the deadline out by the debounce interval. A single timer task per
//! debouncer sleeps until the deadline stops moving and then hands the whole
//! batch to the reconcile callback. Requests that arrive while a batch is
//! being reconciled are picked up by the same timer task afterwards, so
//! batches never overlap.

use std::sync::{Arc, Weak};
use std::time::Duration;

use log::debug;

use crate::runtime::{self, BoxFuture, Instant, Mutex, TimerTask};
use crate::types::{AttributeChange, DesiredState};

type ReconcileFn = dyn Fn(DesiredState) -> BoxFuture<'static, ()> + Send + Sync;

#[derive(Default)]
struct Pending {
    desired: DesiredState,
    deadline: Option<Instant>,
    armed: bool,
    // Held so runtimes that cancel on drop keep the timer alive.
    timer: Option<TimerTask>,
}

struct Shared {
    interval: Duration,
    pending: Mutex<Pending>,
    reconcile: Box<ReconcileFn>,
}

enum Next {
    Fire(DesiredState),
    Wait(Duration),
}

/// Coalesces bursts of attribute changes into single reconcile calls.
///
/// Dropping the debouncer discards anything still pending.
pub struct Debouncer {
    shared: Arc<Shared>,
}

impl Debouncer {
    pub fn new<F>(interval: Duration, reconcile: F) -> Self
    where
        F: Fn(DesiredState) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Debouncer {
            shared: Arc::new(Shared {
                interval,
                pending: Mutex::new(Pending::default()),
                reconcile: Box::new(reconcile),
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    /// Record `change` and restart the quiet period.
    pub async fn request_change(&self, change: AttributeChange) {
        let mut pending = self.shared.pending.lock().await;
        pending.desired.set(change);
        pending.deadline = Some(Instant::now() + self.shared.interval);

        if !pending.armed {
            pending.armed = true;
            pending.timer = Some(runtime::spawn(Self::run_timer(Arc::downgrade(&self.shared))));
        }
    }

    /// Values waiting for the next reconcile.
    pub async fn pending(&self) -> DesiredState {
        self.shared.pending.lock().await.desired.clone()
    }

    /// Reconcile whatever is pending now instead of waiting for the timer.
    pub async fn flush(&self) {
        let batch = {
            let mut pending = self.shared.pending.lock().await;
            pending.deadline = None;
            pending.desired.take()
        };
        if !batch.is_empty() {
            (self.shared.reconcile)(batch).await;
        }
    }

    // The task only holds a weak reference, so dropping the debouncer ends it
    // at the next wake-up.
    async fn run_timer(shared: Weak<Shared>) {
        loop {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let next = {
                let mut pending = shared.pending.lock().await;
                let Some(deadline) = pending.deadline else {
                    pending.armed = false;
                    return;
                };
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    pending.deadline = None;
                    Next::Fire(pending.desired.take())
                } else {
                    Next::Wait(remaining)
                }
            };

            match next {
                Next::Fire(batch) if batch.is_empty() => {}
                Next::Fire(batch) => {
                    debug!("debounce elapsed, reconciling {} attributes", batch.len());
                    (shared.reconcile)(batch).await;
                }
                Next::Wait(remaining) => runtime::sleep(remaining).await,
            }
        }
    }
}
