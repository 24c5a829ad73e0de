// dwh-core/src/ports/cloud.rs

// Capability interfaces over the cloud control plane. Adapters classify
// provider failures into `ProviderError` so the workflow can branch on
// "already exists" / "duplicate permission" / "not found" without seeing SDK types.

use async_trait::async_trait;

use crate::domain::cluster::{
    ClusterDescriptor, ClusterRequest, IngressRule, RoleSpec, SecurityGroup,
};
use crate::domain::error::ProviderError;

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Returns the ARN of the newly created role.
    async fn create_role(&self, spec: &RoleSpec) -> Result<String, ProviderError>;

    async fn attach_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), ProviderError>;

    /// Returns the ARN of an existing role.
    async fn get_role_arn(&self, role_name: &str) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait ClusterControlPlane: Send + Sync {
    async fn create_cluster(&self, request: &ClusterRequest) -> Result<(), ProviderError>;

    /// `Ok(None)` when the provider answers but lists no such cluster.
    async fn describe_cluster(
        &self,
        identifier: &str,
    ) -> Result<Option<ClusterDescriptor>, ProviderError>;
}

#[async_trait]
pub trait NetworkControlPlane: Send + Sync {
    async fn security_groups(&self, vpc_id: &str) -> Result<Vec<SecurityGroup>, ProviderError>;

    async fn authorize_ingress(
        &self,
        group: &SecurityGroup,
        rule: &IngressRule,
    ) -> Result<(), ProviderError>;
}
