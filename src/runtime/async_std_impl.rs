//! async-std backend.

use std::future::Future;
use std::time::Duration;

/// A spawned timer task. Dropping it detaches the task.
#[derive(Debug)]
pub struct TimerTask(async_std::task::JoinHandle<()>);

impl TimerTask {
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        TimerTask(async_std::task::spawn(future))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Clock(std::time::Instant);

impl Clock {
    pub fn now() -> Self {
        Clock(std::time::Instant::now())
    }

    pub fn since(&self, earlier: Clock) -> Duration {
        self.0.saturating_duration_since(earlier.0)
    }

    pub fn after(self, duration: Duration) -> Self {
        Clock(self.0 + duration)
    }
}

pub async fn delay(duration: Duration) {
    async_std::task::sleep(duration).await
}
