use std::time::Duration;
use tokio::time::Instant;

/// Default minimum spacing between outbound lookups.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Cadence governor: enforces a minimum gap between consecutive calls.
///
/// This puts a floor on request spacing; it is not a quota.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_delay: Duration,
    last_release: Option<Instant>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl RateLimiter {
    #[must_use]
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_release: None,
        }
    }

    #[must_use]
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Same interval, no history. Each batch run starts from one of these.
    #[must_use]
    pub fn fresh(&self) -> Self {
        Self::new(self.min_delay)
    }

    /// Wait until `min_delay` has passed since the previous call returned.
    /// The first call returns immediately.
    pub async fn throttle(&mut self) {
        if let Some(last) = self.last_release {
            let ready_at = last + self.min_delay;
            if ready_at > Instant::now() {
                tracing::debug!("Throttling for {:?}", ready_at - Instant::now());
                tokio::time::sleep_until(ready_at).await;
            }
        }
        self.last_release = Some(Instant::now());
    }
}
