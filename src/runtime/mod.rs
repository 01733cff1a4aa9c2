//! Runtime-agnostic timer and task primitives.
//!
//! The debounce scheduler only needs to sleep, spawn a timer task, read a
//! monotonic clock and guard shared state with an async mutex. This module
//! maps those onto whichever async runtime the crate is built for.
//!
//! # Feature Flags
//!
//! - `runtime-tokio` (default) - Use the tokio runtime
//! - `runtime-async-std` - Use the async-std runtime
//! - `runtime-smol` - Use the smol runtime
//!
//! ```toml
//! [dependencies]
//! milight-accessory-rs = { version = "0.1", default-features = false, features = ["runtime-smol"] }
//! ```

use std::future::Future;
use std::ops::Add;
use std::pin::Pin;
use std::time::Duration;

#[cfg(feature = "runtime-tokio")]
mod tokio_impl;
#[cfg(feature = "runtime-tokio")]
use tokio_impl as backend;

#[cfg(feature = "runtime-async-std")]
mod async_std_impl;
#[cfg(feature = "runtime-async-std")]
use async_std_impl as backend;

#[cfg(feature = "runtime-smol")]
mod smol_impl;
#[cfg(feature = "runtime-smol")]
use smol_impl as backend;

pub use backend::TimerTask;

#[cfg(feature = "runtime-tokio")]
pub use tokio::sync::Mutex;

#[cfg(feature = "runtime-async-std")]
pub use async_std::sync::Mutex;

#[cfg(feature = "runtime-smol")]
pub use async_lock::Mutex;

/// A boxed, sendable future, as returned by reconcile callbacks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sleep for the specified duration.
pub async fn sleep(duration: Duration) {
    backend::delay(duration).await
}

/// Spawn a background task on the selected runtime.
///
/// Keep the returned [`TimerTask`] for as long as the task should run; on smol
/// dropping it cancels the task.
pub fn spawn<F>(future: F) -> TimerTask
where
    F: Future<Output = ()> + Send + 'static,
{
    TimerTask::spawn(future)
}

/// A point on the runtime's monotonic clock.
///
/// Under tokio this follows the runtime clock, so paused-time tests drive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Instant(backend::Clock);

impl Instant {
    pub fn now() -> Self {
        Instant(backend::Clock::now())
    }

    pub fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(*self)
    }

    /// Time from `earlier` to `self`, or zero if `earlier` is later.
    pub fn saturating_duration_since(&self, earlier: Instant) -> Duration {
        self.0.since(earlier.0)
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant(self.0.after(rhs))
    }
}

#[cfg(not(any(
    feature = "runtime-tokio",
    feature = "runtime-async-std",
    feature = "runtime-smol"
)))]
compile_error!(
    "One of \"runtime-tokio\", \"runtime-async-std\", or \"runtime-smol\" features must be enabled"
);

#[cfg(all(feature = "runtime-tokio", feature = "runtime-async-std"))]
compile_error!("Features \"runtime-tokio\" and \"runtime-async-std\" are mutually exclusive");

#[cfg(all(feature = "runtime-tokio", feature = "runtime-smol"))]
compile_error!("Features \"runtime-tokio\" and \"runtime-smol\" are mutually exclusive");

#[cfg(all(feature = "runtime-async-std", feature = "runtime-smol"))]
compile_error!("Features \"runtime-async-std\" and \"runtime-smol\" are mutually exclusive");
