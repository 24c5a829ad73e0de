// dwh-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::provisioning::ProvisioningPhase;

/// Failures reported by a cloud control plane, already classified by the adapter.
///
/// Only the classes the provisioning workflow branches on get their own variant;
/// everything else is a `Rejected` carrying the provider's own message.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{operation}: entity already exists ({message})")]
    #[diagnostic(code(dwh::provider::already_exists))]
    AlreadyExists { operation: String, message: String },

    #[error("{operation}: duplicate permission ({message})")]
    #[diagnostic(code(dwh::provider::duplicate_permission))]
    DuplicatePermission { operation: String, message: String },

    #[error("{operation}: not found ({message})")]
    #[diagnostic(code(dwh::provider::not_found))]
    NotFound { operation: String, message: String },

    #[error("{operation} rejected: {message}")]
    #[diagnostic(
        code(dwh::provider::rejected),
        help("Check the AWS credentials, region and quotas in the configuration file.")
    )]
    Rejected { operation: String, message: String },
}

impl ProviderError {
    pub fn rejected(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Rejected {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, ProviderError::AlreadyExists { .. })
    }

    pub fn is_duplicate_permission(&self) -> bool {
        matches!(self, ProviderError::DuplicatePermission { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("IAM role '{role_name}' already exists")]
    #[diagnostic(
        code(dwh::domain::role_conflict),
        help("Re-run with --reuse-role to attach the existing role to the cluster.")
    )]
    RoleConflict { role_name: String },

    #[error("Cluster '{cluster_id}' entered status '{status}' while waiting for availability")]
    #[diagnostic(code(dwh::domain::cluster_failed))]
    ClusterFailed { cluster_id: String, status: String },

    #[error("Cluster '{cluster_id}' was not available after {waited_secs}s")]
    #[diagnostic(
        code(dwh::domain::wait_timeout),
        help("The cluster may still come up; raise --wait-timeout or check the console.")
    )]
    WaitTimedOut { cluster_id: String, waited_secs: u64 },

    #[error("Cluster '{0}' is not described by the provider")]
    #[diagnostic(code(dwh::domain::cluster_missing))]
    ClusterMissing(String),

    #[error("An ingress rule for {cidr} on port {port} already exists")]
    #[diagnostic(
        code(dwh::domain::network_rule_conflict),
        help("The existing rule can be used to reach the database; re-run with --reuse-network-rule.")
    )]
    NetworkRuleConflict { cidr: String, port: u16 },

    #[error("Cluster descriptor has no {0}")]
    #[diagnostic(code(dwh::domain::missing_output))]
    MissingOutput(&'static str),

    #[error("Invalid provisioning transition: {from:?} -> {to:?}")]
    #[diagnostic(code(dwh::domain::transition))]
    InvalidTransition {
        from: ProvisioningPhase,
        to: ProvisioningPhase,
    },

    #[error("Configuration is incomplete: {0}")]
    #[diagnostic(
        code(dwh::domain::incomplete_config),
        help("Run `dwh provision` first, or fill the value in manually.")
    )]
    IncompleteConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_classification() {
        let dup = ProviderError::DuplicatePermission {
            operation: "AuthorizeSecurityGroupIngress".into(),
            message: "the specified rule already exists".into(),
        };
        assert!(dup.is_duplicate_permission());
        assert!(!dup.is_already_exists());

        let rejected = ProviderError::rejected("CreateCluster", "quota exceeded");
        assert_eq!(rejected.to_string(), "CreateCluster rejected: quota exceeded");
    }
}
