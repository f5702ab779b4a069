//! Fixed-delay throttle.

use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Sleeps a fixed delay before every call after the first.
///
/// Premium keys skip the delay entirely. Unlike a sliding-window limiter the
/// delay does not account for time already spent between calls.
#[derive(Debug)]
pub(crate) struct Throttle {
    delay: Duration,
    premium: bool,
    calls: u64,
}

impl Throttle {
    pub(crate) const fn new(delay: Duration, premium: bool) -> Self {
        Self {
            delay,
            premium,
            calls: 0,
        }
    }

    /// Waits if needed, then counts the call.
    pub(crate) async fn wait(&mut self) {
        if !self.premium && self.calls > 0 && !self.delay.is_zero() {
            debug!(delay_ms = self.delay.as_millis() as u64, "Throttling call");
            sleep(self.delay).await;
        }
        self.calls += 1;
    }

    pub(crate) const fn calls(&self) -> u64 {
        self.calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_first_call_is_not_delayed() {
        let mut throttle = Throttle::new(Duration::from_secs(60), false);
        let start = Instant::now();
        throttle.wait().await;
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(throttle.calls(), 1);
    }

    #[tokio::test]
    async fn test_subsequent_calls_are_delayed() {
        let mut throttle = Throttle::new(Duration::from_millis(50), false);
        throttle.wait().await;
        let start = Instant::now();
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(throttle.calls(), 2);
    }

    #[tokio::test]
    async fn test_premium_is_never_delayed() {
        let mut throttle = Throttle::new(Duration::from_secs(60), true);
        let start = Instant::now();
        for _ in 0..3 {
            throttle.wait().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(throttle.calls(), 3);
    }
}
