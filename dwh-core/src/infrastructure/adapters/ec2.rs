// dwh-core/src/infrastructure/adapters/ec2.rs

use async_trait::async_trait;
use aws_sdk_ec2::types::{Filter, IpPermission, IpRange};
use tracing::instrument;

use crate::domain::cluster::{IngressRule, SecurityGroup};
use crate::domain::error::ProviderError;
use crate::infrastructure::adapters::aws::classify;
use crate::ports::cloud::NetworkControlPlane;

pub struct Ec2NetworkControlPlane {
    client: aws_sdk_ec2::Client,
}

impl Ec2NetworkControlPlane {
    pub fn new(client: aws_sdk_ec2::Client) -> Self {
        Self { client }
    }
}

fn ip_permission(rule: &IngressRule) -> IpPermission {
    IpPermission::builder()
        .ip_protocol(&rule.protocol)
        .from_port(i32::from(rule.port))
        .to_port(i32::from(rule.port))
        .ip_ranges(
            IpRange::builder()
                .cidr_ip(&rule.cidr)
                .description("dwh client access")
                .build(),
        )
        .build()
}

#[async_trait]
impl NetworkControlPlane for Ec2NetworkControlPlane {
    #[instrument(skip(self))]
    async fn security_groups(&self, vpc_id: &str) -> Result<Vec<SecurityGroup>, ProviderError> {
        let output = self
            .client
            .describe_security_groups()
            .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
            .send()
            .await
            .map_err(|e| classify("DescribeSecurityGroups", e))?;

        Ok(output
            .security_groups()
            .iter()
            .filter_map(|g| {
                g.group_id().map(|id| SecurityGroup {
                    id: id.to_string(),
                    name: g.group_name().map(str::to_string),
                })
            })
            .collect())
    }

    #[instrument(skip(self, group), fields(group = %group.id))]
    async fn authorize_ingress(
        &self,
        group: &SecurityGroup,
        rule: &IngressRule,
    ) -> Result<(), ProviderError> {
        self.client
            .authorize_security_group_ingress()
            .group_id(&group.id)
            .ip_permissions(ip_permission(rule))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify("AuthorizeSecurityGroupIngress", e))
    }
}
