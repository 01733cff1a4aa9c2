//! Tokio backend.

use std::future::Future;
use std::time::Duration;

/// A spawned timer task. Dropping it leaves the task running.
#[derive(Debug)]
pub struct TimerTask(tokio::task::JoinHandle<()>);

impl TimerTask {
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        TimerTask(tokio::spawn(future))
    }
}

/// Clock reading from the tokio time driver, so a paused runtime clock
/// applies to debounce deadlines too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Clock(tokio::time::Instant);

impl Clock {
    pub fn now() -> Self {
        Clock(tokio::time::Instant::now())
    }

    pub fn since(&self, earlier: Clock) -> Duration {
        self.0.saturating_duration_since(earlier.0)
    }

    pub fn after(self, duration: Duration) -> Self {
        Clock(self.0 + duration)
    }
}

pub async fn delay(duration: Duration) {
    tokio::time::sleep(duration).await
}
