// dwh-core/src/ports/clock.rs

use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Time source of the availability poller, swapped for a manual clock in tests.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}
