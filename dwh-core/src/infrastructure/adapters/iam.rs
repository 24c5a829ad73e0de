// dwh-core/src/infrastructure/adapters/iam.rs

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, instrument};

use crate::domain::cluster::RoleSpec;
use crate::domain::error::ProviderError;
use crate::infrastructure::adapters::aws::classify;
use crate::ports::cloud::RoleStore;

pub struct IamRoleStore {
    client: aws_sdk_iam::Client,
}

impl IamRoleStore {
    pub fn new(client: aws_sdk_iam::Client) -> Self {
        Self { client }
    }
}

fn trust_policy(service_principal: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Action": "sts:AssumeRole",
            "Effect": "Allow",
            "Principal": { "Service": service_principal }
        }]
    })
    .to_string()
}

#[async_trait]
impl RoleStore for IamRoleStore {
    #[instrument(skip(self, spec), fields(role = %spec.name))]
    async fn create_role(&self, spec: &RoleSpec) -> Result<String, ProviderError> {
        let output = self
            .client
            .create_role()
            .path("/")
            .role_name(&spec.name)
            .description(&spec.description)
            .assume_role_policy_document(trust_policy(&spec.service_principal))
            .send()
            .await
            .map_err(|e| classify("CreateRole", e))?;

        let arn = output
            .role()
            .map(|role| role.arn().to_string())
            .ok_or_else(|| ProviderError::rejected("CreateRole", "response carried no role"))?;
        info!(%arn, "Role created");
        Ok(arn)
    }

    #[instrument(skip(self))]
    async fn attach_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), ProviderError> {
        self.client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify("AttachRolePolicy", e))
    }

    #[instrument(skip(self))]
    async fn get_role_arn(&self, role_name: &str) -> Result<String, ProviderError> {
        let output = self
            .client
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| classify("GetRole", e))?;

        output
            .role()
            .map(|role| role.arn().to_string())
            .ok_or_else(|| ProviderError::rejected("GetRole", "response carried no role"))
    }
}
