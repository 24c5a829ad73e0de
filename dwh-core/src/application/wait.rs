// dwh-core/src/application/wait.rs

use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::domain::cluster::{ClusterDescriptor, ClusterStatus};
use crate::domain::error::DomainError;
use crate::error::DwhError;
use crate::ports::clock::Clock;
use crate::ports::cloud::ClusterControlPlane;

/// Backoff schedule of the availability poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
    /// `None` waits for as long as the cluster keeps a non-failure status.
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(60),
            multiplier: 2,
            timeout: None,
        }
    }
}

impl WaitPolicy {
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(self.multiplier).min(self.max_delay)
    }
}

/// Polls until the cluster reports `available`.
///
/// "Not found" and an empty answer mean the cluster is not visible yet.
/// Failure statuses and any other provider error end the wait.
#[instrument(skip(plane, clock, policy))]
pub async fn wait_until_available(
    plane: &dyn ClusterControlPlane,
    clock: &dyn Clock,
    identifier: &str,
    policy: &WaitPolicy,
) -> Result<ClusterDescriptor, DwhError> {
    let started = clock.now();
    let mut delay = policy.initial_delay;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match plane.describe_cluster(identifier).await {
            Ok(Some(descriptor)) if descriptor.status == ClusterStatus::Available => {
                info!(attempt, "Cluster is available");
                return Ok(descriptor);
            }
            Ok(Some(descriptor)) if descriptor.status.is_failure() => {
                return Err(DomainError::ClusterFailed {
                    cluster_id: identifier.to_string(),
                    status: descriptor.status.as_str().to_string(),
                }
                .into());
            }
            Ok(Some(descriptor)) => {
                debug!(attempt, status = descriptor.status.as_str(), "Cluster not ready");
            }
            Ok(None) => debug!(attempt, "Cluster not visible yet"),
            Err(e) if e.is_not_found() => debug!(attempt, "Cluster not visible yet"),
            Err(e) => return Err(e.into()),
        }

        let mut pause = delay;
        if let Some(timeout) = policy.timeout {
            let waited = clock.now().saturating_duration_since(started);
            if waited >= timeout {
                return Err(DomainError::WaitTimedOut {
                    cluster_id: identifier.to_string(),
                    waited_secs: waited.as_secs(),
                }
                .into());
            }
            pause = pause.min(timeout - waited);
        }

        clock.sleep(pause).await;
        delay = policy.next_delay(delay);
    }
}
