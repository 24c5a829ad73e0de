// dwh-core/src/infrastructure/clock.rs

use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::ports::clock::Clock;

pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
