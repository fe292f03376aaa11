//! One-shot expiry timer for forced logout.

// Allow dead code: introspection helpers are test/diagnostic surface
#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to a single armed expiry callback.
///
/// Arming spawns one task that sleeps for the given duration and then runs
/// the callback exactly once. The handle must be kept: dropping it does not
/// cancel the timer, only [`ExpiryTimer::disarm`] does. The orchestrator
/// holds at most one handle at a time and disarms before every new arm.
#[derive(Debug)]
pub struct ExpiryTimer {
    handle: JoinHandle<()>,
}

impl ExpiryTimer {
    /// Schedule `on_expire` to run once after `after` has elapsed.
    ///
    /// A zero duration (including one clamped from a negative remaining
    /// token lifetime) fires on the next timer tick rather than erroring;
    /// that is how already-expired restored sessions get logged out.
    pub fn arm<F>(after: Duration, on_expire: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        debug!(after_ms = after.as_millis() as u64, "arming expiry timer");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            on_expire.await;
        });
        Self { handle }
    }

    /// Cancel the pending callback. No-op if it already fired.
    pub fn disarm(self) {
        self.handle.abort();
    }

    /// Whether the timer task has already run (or been aborted).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
