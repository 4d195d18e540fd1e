// File: src/clock.rs
//
// Clock abstraction for deterministic waiting.
//
// Everything in the harness that waits (sandbox readiness polling, the
// waiter helpers) goes through this trait so tests can drive time with
// tokio's paused runtime instead of real delays.

use std::future::Future;
use std::pin::Pin;

use tokio::time::{self, Duration, Instant};

/// Source of time for polling loops.
///
/// Inject [`SystemClock`] in normal use and [`PausedClock`] in tests that
/// need instant, reproducible timeouts.
///
/// # Example
///
/// ```rust,ignore
/// use helios_workspaces::clock::{Clock, PausedClock};
///
/// #[tokio::test(start_paused = true)]
/// async fn test_timeout_path() {
///     let clock = Arc::new(PausedClock::new());
///     clock.advance(Duration::from_secs(31)).await;
///     // a 30s readiness deadline has now elapsed without any real waiting
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Current instant. Simulated time under a paused tokio runtime.
    fn now(&self) -> Instant;

    /// Sleep for `d`. Returns instantly under a paused runtime once time
    /// is advanced past the deadline.
    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Real tokio time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(time::sleep(d))
    }
}

/// Manually advanced time for tests.
///
/// Requires the paused tokio runtime: either `#[tokio::test(start_paused =
/// true)]` or the `time::pause()` call made by [`PausedClock::new`].
pub struct PausedClock;

impl PausedClock {
    /// Create the clock and pause tokio time if it is not already paused.
    pub fn new() -> Self {
        time::pause();
        Self
    }

    /// Advance simulated time, waking any sleeps that expire.
    pub async fn advance(&self, d: Duration) {
        time::advance(d).await
    }
}

impl Clock for PausedClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(time::sleep(d))
    }
}

impl Default for PausedClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_paused_clock_only_moves_on_advance() {
        let clock = Arc::new(PausedClock::new());
        let start = clock.now();

        clock.advance(Duration::from_secs(5)).await;
        assert_eq!(clock.now() - start, Duration::from_secs(5));

        clock.advance(Duration::from_millis(250)).await;
        assert_eq!(
            clock.now() - start,
            Duration::from_secs(5) + Duration::from_millis(250)
        );
    }

    #[tokio::test]
    async fn test_paused_sleep_wakes_after_advance() {
        let clock = Arc::new(PausedClock::new());

        let sleeper = {
            let clock = clock.clone();
            tokio::spawn(async move {
                clock.sleep(Duration::from_secs(2)).await;
                42
            })
        };

        // Let the task register its timer before advancing.
        tokio::task::yield_now().await;
        clock.advance(Duration::from_secs(3)).await;

        assert_eq!(sleeper.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_system_clock_really_sleeps() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let start = clock.now();

        clock.sleep(Duration::from_millis(10)).await;

        assert!(clock.now() - start >= Duration::from_millis(10));
    }
}
