// dwh-core/src/domain/cluster.rs
//
// Provider-neutral view of the cluster, its network and its access role.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::domain::error::DomainError;

/// Service principal allowed to assume the warehouse access role.
pub const WAREHOUSE_SERVICE_PRINCIPAL: &str = "redshift.amazonaws.com";
/// Managed policy granting read-only access to object storage.
pub const STORAGE_READ_ONLY_POLICY_ARN: &str = "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    pub name: String,
    pub description: String,
    pub service_principal: String,
}

impl RoleSpec {
    pub fn warehouse_storage_reader(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: "Allows Redshift clusters to read S3 buckets".to_string(),
            service_principal: WAREHOUSE_SERVICE_PRINCIPAL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterStatus {
    Creating,
    Available,
    Modifying,
    Rebooting,
    Resizing,
    Deleting,
    Failed,
    Incompatible(String),
    Other(String),
}

impl ClusterStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "creating" => ClusterStatus::Creating,
            "available" => ClusterStatus::Available,
            "modifying" => ClusterStatus::Modifying,
            "rebooting" => ClusterStatus::Rebooting,
            "resizing" => ClusterStatus::Resizing,
            "deleting" => ClusterStatus::Deleting,
            "failed" => ClusterStatus::Failed,
            s if s.starts_with("incompatible-") => ClusterStatus::Incompatible(s.to_string()),
            s => ClusterStatus::Other(s.to_string()),
        }
    }

    /// States from which the cluster never becomes available on its own.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ClusterStatus::Deleting | ClusterStatus::Failed | ClusterStatus::Incompatible(_)
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            ClusterStatus::Creating => "creating",
            ClusterStatus::Available => "available",
            ClusterStatus::Modifying => "modifying",
            ClusterStatus::Rebooting => "rebooting",
            ClusterStatus::Resizing => "resizing",
            ClusterStatus::Deleting => "deleting",
            ClusterStatus::Failed => "failed",
            ClusterStatus::Incompatible(s) | ClusterStatus::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    pub identifier: String,
    pub status: ClusterStatus,
    pub endpoint_address: Option<String>,
    pub endpoint_port: Option<u16>,
    pub vpc_id: Option<String>,
    pub iam_role_arns: Vec<String>,
}

/// The two values handed over to the ELT stage through the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterOutputs {
    pub endpoint: String,
    pub role_arn: String,
}

impl ClusterOutputs {
    pub fn from_descriptor(descriptor: &ClusterDescriptor) -> Result<Self, DomainError> {
        let endpoint = descriptor
            .endpoint_address
            .clone()
            .ok_or(DomainError::MissingOutput("endpoint address"))?;
        let role_arn = descriptor
            .iam_role_arns
            .first()
            .cloned()
            .ok_or(DomainError::MissingOutput("IAM role"))?;
        Ok(Self { endpoint, role_arn })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRequest {
    pub identifier: String,
    pub cluster_type: crate::domain::config::ClusterType,
    pub node_type: String,
    pub num_nodes: u32,
    pub db_name: String,
    pub master_username: String,
    pub master_password: String,
    pub port: u16,
    pub iam_role_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroup {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressRule {
    pub protocol: String,
    pub cidr: String,
    pub port: u16,
}

impl IngressRule {
    pub fn tcp(cidr: &str, port: u16) -> Self {
        Self {
            protocol: "tcp".to_string(),
            cidr: cidr.to_string(),
            port,
        }
    }
}

/// Accepts `a.b.c.d`, `a.b.c.d/n` or their IPv6 forms; bare addresses get a host prefix.
pub fn normalize_cidr(raw: &str) -> Option<String> {
    let raw = raw.trim();
    match raw.split_once('/') {
        Some((addr, prefix)) => {
            let addr: IpAddr = addr.parse().ok()?;
            let prefix: u8 = prefix.parse().ok()?;
            let max = if addr.is_ipv4() { 32 } else { 128 };
            (prefix <= max).then(|| format!("{}/{}", addr, prefix))
        }
        None => {
            let addr: IpAddr = raw.parse().ok()?;
            let prefix = if addr.is_ipv4() { 32 } else { 128 };
            Some(format!("{}/{}", addr, prefix))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn descriptor() -> ClusterDescriptor {
        ClusterDescriptor {
            identifier: "dwhcluster".into(),
            status: ClusterStatus::Available,
            endpoint_address: Some("dwhcluster.abc.us-west-2.redshift.amazonaws.com".into()),
            endpoint_port: Some(5439),
            vpc_id: Some("vpc-1234".into()),
            iam_role_arns: vec!["arn:aws:iam::123456789012:role/dwhRole".into()],
        }
    }

    #[test]
    fn test_normalize_cidr() {
        assert_eq!(normalize_cidr("10.0.0.1").as_deref(), Some("10.0.0.1/32"));
        assert_eq!(normalize_cidr(" 10.0.0.0/8 ").as_deref(), Some("10.0.0.0/8"));
        assert_eq!(normalize_cidr("::1").as_deref(), Some("::1/128"));
        assert_eq!(normalize_cidr("10.0.0.0/33"), None);
        assert_eq!(normalize_cidr("localhost"), None);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ClusterStatus::parse("available"), ClusterStatus::Available);
        assert!(ClusterStatus::parse("deleting").is_failure());
        assert!(ClusterStatus::parse("incompatible-network").is_failure());
        assert!(!ClusterStatus::parse("creating").is_failure());
        assert_eq!(ClusterStatus::parse("paused").as_str(), "paused");
    }

    #[test]
    fn test_outputs_match_descriptor() -> Result<()> {
        let d = descriptor();
        let outputs = ClusterOutputs::from_descriptor(&d)?;
        assert_eq!(Some(outputs.endpoint), d.endpoint_address);
        assert_eq!(outputs.role_arn, d.iam_role_arns[0]);
        Ok(())
    }

    #[test]
    fn test_outputs_require_endpoint() {
        let mut d = descriptor();
        d.endpoint_address = None;
        assert!(matches!(
            ClusterOutputs::from_descriptor(&d),
            Err(DomainError::MissingOutput("endpoint address"))
        ));
    }
}
