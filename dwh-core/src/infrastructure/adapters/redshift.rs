// dwh-core/src/infrastructure/adapters/redshift.rs

use async_trait::async_trait;
use aws_sdk_redshift::types::Cluster;
use tracing::{debug, instrument};

use crate::domain::cluster::{ClusterDescriptor, ClusterRequest, ClusterStatus};
use crate::domain::config::ClusterType;
use crate::domain::error::ProviderError;
use crate::infrastructure::adapters::aws::classify;
use crate::ports::cloud::ClusterControlPlane;

pub struct RedshiftControlPlane {
    client: aws_sdk_redshift::Client,
}

impl RedshiftControlPlane {
    pub fn new(client: aws_sdk_redshift::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterControlPlane for RedshiftControlPlane {
    #[instrument(skip(self, request), fields(cluster = %request.identifier))]
    async fn create_cluster(&self, request: &ClusterRequest) -> Result<(), ProviderError> {
        let mut builder = self
            .client
            .create_cluster()
            .cluster_identifier(&request.identifier)
            .cluster_type(request.cluster_type.as_str())
            .node_type(&request.node_type)
            .db_name(&request.db_name)
            .master_username(&request.master_username)
            .master_user_password(&request.master_password)
            .port(i32::from(request.port))
            .iam_roles(&request.iam_role_arn);

        // The API rejects NumberOfNodes on single-node clusters.
        if request.cluster_type == ClusterType::MultiNode {
            let nodes = i32::try_from(request.num_nodes).map_err(|_| {
                ProviderError::rejected("CreateCluster", "node count out of range")
            })?;
            builder = builder.number_of_nodes(nodes);
        }

        builder
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify("CreateCluster", e))
    }

    #[instrument(skip(self))]
    async fn describe_cluster(
        &self,
        identifier: &str,
    ) -> Result<Option<ClusterDescriptor>, ProviderError> {
        let output = self
            .client
            .describe_clusters()
            .cluster_identifier(identifier)
            .send()
            .await
            .map_err(|e| classify("DescribeClusters", e))?;

        let descriptor = output
            .clusters()
            .first()
            .map(|cluster| to_descriptor(identifier, cluster));
        debug!(?descriptor, "DescribeClusters answered");
        Ok(descriptor)
    }
}

fn to_descriptor(identifier: &str, cluster: &Cluster) -> ClusterDescriptor {
    let endpoint = cluster.endpoint();
    ClusterDescriptor {
        identifier: cluster
            .cluster_identifier()
            .unwrap_or(identifier)
            .to_string(),
        status: ClusterStatus::parse(cluster.cluster_status().unwrap_or("unknown")),
        endpoint_address: endpoint.and_then(|e| e.address()).map(str::to_string),
        endpoint_port: endpoint
            .and_then(|e| e.port())
            .and_then(|p| u16::try_from(p).ok()),
        vpc_id: cluster.vpc_id().map(str::to_string),
        iam_role_arns: cluster
            .iam_roles()
            .iter()
            .filter_map(|role| role.iam_role_arn())
            .map(str::to_string)
            .collect(),
    }
}
