//! Idle shutdown watchdog
//!
//! Once the request count reaches the threshold the watchdog is armed with
//! a deadline of `now + idle_timeout`. Every later request pushes the
//! deadline out again. When the deadline passes the server shuts down.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::info;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Real monotonic clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Default)]
struct WatchdogState {
    requests: u64,
    deadline: Option<Instant>,
    cancelled: bool,
}

/// Shuts the target down after a quiet period following enough load
pub struct IdleWatchdog {
    clock: Arc<dyn Clock>,
    threshold: u64,
    idle_timeout: Duration,
    state: Mutex<WatchdogState>,
}

impl IdleWatchdog {
    pub fn new(threshold: u64, idle_timeout: Duration) -> Self {
        Self::with_clock(threshold, idle_timeout, Arc::new(SystemClock))
    }

    pub fn with_clock(threshold: u64, idle_timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            threshold,
            idle_timeout,
            state: Mutex::new(WatchdogState::default()),
        }
    }

    /// Count one request and return its 1-based number.
    ///
    /// Arms the watchdog when the threshold is reached and resets the
    /// deadline on every request after that.
    pub fn record_request(&self) -> u64 {
        let now = self.clock.now();
        let mut state = self.lock();
        state.requests += 1;

        if !state.cancelled && state.requests >= self.threshold {
            if state.deadline.is_none() {
                info!(
                    "Watchdog armed after {} requests ({}s idle timeout)",
                    state.requests,
                    self.idle_timeout.as_secs()
                );
            }
            state.deadline = Some(now + self.idle_timeout);
        }

        state.requests
    }

    /// Disarm permanently
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.cancelled = true;
        state.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.lock().deadline.is_some()
    }

    pub fn request_count(&self) -> u64 {
        self.lock().requests
    }

    /// Whether the idle deadline has passed
    pub fn expired(&self) -> bool {
        let now = self.clock.now();
        matches!(self.lock().deadline, Some(deadline) if now >= deadline)
    }

    /// Resolve once the watchdog expires, checking every `poll` interval
    pub async fn wait_expired(&self, poll: Duration) {
        let mut ticker = tokio::time::interval(poll);
        loop {
            ticker.tick().await;
            if self.expired() {
                info!(
                    "Inactivity detected after {} requests, shutting down",
                    self.request_count()
                );
                return;
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WatchdogState> {
        // A poisoned counter is still a usable counter
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}


#[cfg(test)]
mod tests {
    use super::manual::ManualClock;
    use super::*;

    fn watchdog(threshold: u64) -> (IdleWatchdog, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let dog = IdleWatchdog::with_clock(threshold, Duration::from_secs(5), clock.clone());
        (dog, clock)
    }

    #[test]
    fn test_not_armed_below_threshold() {
        let (dog, clock) = watchdog(100);
        for _ in 0..99 {
            dog.record_request();
        }
        clock.advance(Duration::from_secs(60));
        assert!(!dog.is_armed());
        assert!(!dog.expired());
    }

    #[test]
    fn test_expires_after_idle_timeout() {
        let (dog, clock) = watchdog(100);
        for _ in 0..100 {
            dog.record_request();
        }
        assert!(dog.is_armed());

        clock.advance(Duration::from_millis(4_999));
        assert!(!dog.expired());
        clock.advance(Duration::from_millis(1));
        assert!(dog.expired());
    }

    #[test]
    fn test_requests_reset_deadline() {
        let (dog, clock) = watchdog(2);
        dog.record_request();
        dog.record_request();

        clock.advance(Duration::from_secs(4));
        assert_eq!(dog.record_request(), 3);

        clock.advance(Duration::from_secs(4));
        assert!(!dog.expired());
        clock.advance(Duration::from_secs(1));
        assert!(dog.expired());
    }

    #[test]
    fn test_cancel_disarms() {
        let (dog, clock) = watchdog(1);
        dog.record_request();
        dog.cancel();
        dog.record_request();

        clock.advance(Duration::from_secs(10));
        assert!(!dog.is_armed());
        assert!(!dog.expired());
        assert_eq!(dog.request_count(), 2);
    }

    #[tokio::test]
    async fn test_wait_expired_resolves() {
        let (dog, clock) = watchdog(1);
        dog.record_request();
        clock.advance(Duration::from_secs(5));

        tokio::time::timeout(
            Duration::from_secs(1),
            dog.wait_expired(Duration::from_millis(10)),
        )
        .await
        .expect("watchdog should have expired");
    }
}
