// dwh-core/src/domain/provisioning.rs

use serde::{Deserialize, Serialize};

use crate::domain::cluster::{ClusterDescriptor, ClusterOutputs};
use crate::domain::error::DomainError;

/// Lifecycle of one `dwh provision` run.
///
/// ```text
/// Unrequested -> Requested -> Available -> NetworkConfigured -> Persisted
///      \______________\___________\_______________\_____________> Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisioningPhase {
    Unrequested,
    Requested,
    Available,
    NetworkConfigured,
    Persisted,
    Aborted,
}

impl ProvisioningPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProvisioningPhase::Persisted | ProvisioningPhase::Aborted)
    }

    pub fn can_advance_to(self, next: ProvisioningPhase) -> bool {
        use ProvisioningPhase::*;
        match (self, next) {
            (Unrequested, Requested)
            | (Requested, Available)
            | (Available, NetworkConfigured)
            | (NetworkConfigured, Persisted) => true,
            (from, Aborted) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// In-memory state owned by the provisioner; never persisted as a whole.
#[derive(Debug, Clone)]
pub struct ProvisioningState {
    phase: ProvisioningPhase,
    pub role_arn: Option<String>,
    pub cluster: Option<ClusterDescriptor>,
    pub outputs: Option<ClusterOutputs>,
}

impl Default for ProvisioningState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvisioningState {
    pub fn new() -> Self {
        Self {
            phase: ProvisioningPhase::Unrequested,
            role_arn: None,
            cluster: None,
            outputs: None,
        }
    }

    pub fn phase(&self) -> ProvisioningPhase {
        self.phase
    }

    pub fn advance(&mut self, next: ProvisioningPhase) -> Result<(), DomainError> {
        if !self.phase.can_advance_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Moves to `Aborted` unless already terminal; returns the phase the run stopped in.
    pub fn abort(&mut self) -> ProvisioningPhase {
        let stopped_in = self.phase;
        if !self.phase.is_terminal() {
            self.phase = ProvisioningPhase::Aborted;
        }
        stopped_in
    }
}
