use crate::traits::Throttle;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Sleeps for a fixed duration between sources.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }
}

#[async_trait]
impl Throttle for FixedDelay {
    async fn pause(&self) {
        if self.0.is_zero() {
            return;
        }
        debug!("Waiting {:?} before the next source", self.0);
        tokio::time::sleep(self.0).await;
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Throttle for NoDelay {
    async fn pause(&self) {}
}
