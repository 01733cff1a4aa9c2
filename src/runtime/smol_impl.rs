//! smol backend.

use std::future::Future;
use std::time::Duration;

/// A spawned timer task.
///
/// smol cancels a task when its handle is dropped, so the owner keeps this
/// for as long as the timer should run.
#[derive(Debug)]
pub struct TimerTask(smol::Task<()>);

impl TimerTask {
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        TimerTask(smol::spawn(future))
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
    smol::Timer::after(duration).await;
}
