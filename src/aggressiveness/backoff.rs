// Wait strategies between scoring attempts.

use std::time::Duration;

use async_trait::async_trait;

/// Interval between failed scoring attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// How long to wait before retry number `attempt` (1-based).
#[async_trait]
pub trait Backoff: Send + Sync {
    async fn wait(&self, attempt: u32);
}

/// Sleep a fixed interval regardless of the attempt number.
pub struct FixedBackoff {
    interval: Duration,
}

impl FixedBackoff {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF)
    }
}

#[async_trait]
impl Backoff for FixedBackoff {
    async fn wait(&self, _attempt: u32) {
        tokio::time::sleep(self.interval).await;
    }
}

/// Retry immediately. For tests.
pub struct NoBackoff;

#[async_trait]
impl Backoff for NoBackoff {
    async fn wait(&self, _attempt: u32) {}
}
