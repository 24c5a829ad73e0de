// dwh-core/src/domain/config.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::domain::cluster::normalize_cidr;
use crate::domain::error::DomainError;

/// Section holding the warehouse parameters and the provisioning outputs.
pub const DWH_SECTION: &str = "DWH";
/// Written by `dwh provision`, read by `dwh etl`.
pub const ENDPOINT_OPTION: &str = "dwh_endpoint";
/// Written by `dwh provision`, read by `dwh etl`.
pub const ROLE_ARN_OPTION: &str = "dwh_s3_iam_arn";

/// SQL engine the ELT statements run against.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Redshift,
    DuckDb,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterType {
    SingleNode,
    MultiNode,
}

impl ClusterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterType::SingleNode => "single-node",
            ClusterType::MultiNode => "multi-node",
        }
    }
}

// =============================================================================
//  1. CONFIGURATION DOCUMENT (what the YAML file holds)
// =============================================================================

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct DwhConfig {
    #[serde(rename = "AWS")]
    #[validate(nested)]
    pub aws: AwsSection,

    #[serde(rename = "DWH")]
    #[validate(nested)]
    pub dwh: DwhSection,

    #[serde(rename = "LOCAL")]
    #[validate(nested)]
    pub local: LocalSection,

    #[serde(rename = "S3")]
    #[validate(nested)]
    pub s3: S3Section,

    #[serde(rename = "ETL", default)]
    pub etl: EtlSection,
}

#[derive(Deserialize, Serialize, Clone, Validate)]
pub struct AwsSection {
    #[validate(length(min = 1, message = "AWS key cannot be empty"))]
    pub key: String,
    #[validate(length(min = 1, message = "AWS secret cannot be empty"))]
    pub secret: String,
    #[validate(length(min = 1, message = "AWS region cannot be empty"))]
    pub region: String,
}

impl fmt::Debug for AwsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsSection")
            .field("key", &self.key)
            .field("secret", &"***")
            .field("region", &self.region)
            .finish()
    }
}

#[derive(Deserialize, Serialize, Clone, Validate)]
#[validate(schema(function = "validate_cluster_shape"))]
pub struct DwhSection {
    pub dwh_cluster_type: ClusterType,
    #[validate(range(min = 1, max = 128))]
    pub dwh_num_nodes: u32,
    #[validate(length(min = 1))]
    pub dwh_node_type: String,
    #[validate(custom(function = "validate_cluster_identifier"))]
    pub dwh_cluster_identifier: String,
    #[validate(custom(function = "validate_identifier"))]
    pub dwh_db: String,
    #[validate(length(min = 1, max = 128))]
    pub dwh_db_user: String,
    #[validate(length(min = 8, max = 64, message = "Redshift passwords are 8 to 64 characters"))]
    pub dwh_db_password: String,
    #[validate(range(min = 1150))]
    pub dwh_db_port: u16,
    #[validate(length(min = 1, max = 64))]
    pub dwh_iam_role_name: String,
    #[validate(custom(function = "validate_identifier"))]
    pub dwh_schema: String,

    // Provisioning outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwh_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwh_s3_iam_arn: Option<String>,
}

impl fmt::Debug for DwhSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DwhSection")
            .field("dwh_cluster_type", &self.dwh_cluster_type)
            .field("dwh_num_nodes", &self.dwh_num_nodes)
            .field("dwh_node_type", &self.dwh_node_type)
            .field("dwh_cluster_identifier", &self.dwh_cluster_identifier)
            .field("dwh_db", &self.dwh_db)
            .field("dwh_db_user", &self.dwh_db_user)
            .field("dwh_db_password", &"***")
            .field("dwh_db_port", &self.dwh_db_port)
            .field("dwh_iam_role_name", &self.dwh_iam_role_name)
            .field("dwh_schema", &self.dwh_schema)
            .field("dwh_endpoint", &self.dwh_endpoint)
            .field("dwh_s3_iam_arn", &self.dwh_s3_iam_arn)
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct LocalSection {
    #[validate(custom(function = "validate_cidr"))]
    pub out_ip: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct S3Section {
    #[validate(length(min = 1))]
    pub log_data: String,
    #[validate(length(min = 1))]
    pub log_jsonpath: String,
    #[validate(length(min = 1))]
    pub song_data: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EtlSection {
    #[serde(default)]
    pub engine: Engine,
    #[serde(default = "default_duckdb_path")]
    pub duckdb_path: String,
}

impl Default for EtlSection {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            duckdb_path: default_duckdb_path(),
        }
    }
}

fn default_duckdb_path() -> String {
    "dwh.duckdb".to_string()
}

// --- VALIDATORS ---

// Compiled once; `None` only if a hardcoded pattern is broken.
static IDENTIFIER_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,126}$").ok());
static CLUSTER_ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,62}$").ok());

fn matches_pattern(
    pattern: &Option<Regex>,
    value: &str,
    code: &'static str,
) -> Result<(), ValidationError> {
    let re = pattern.as_ref().ok_or_else(|| ValidationError::new("pattern"))?;
    if re.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new(code))
    }
}

fn validate_identifier(value: &str) -> Result<(), ValidationError> {
    matches_pattern(&IDENTIFIER_PATTERN, value, "sql_identifier")
}

fn validate_cluster_identifier(value: &str) -> Result<(), ValidationError> {
    matches_pattern(&CLUSTER_ID_PATTERN, value, "cluster_identifier")?;
    if value.ends_with('-') || value.contains("--") {
        return Err(ValidationError::new("cluster_identifier"));
    }
    Ok(())
}

fn validate_cidr(value: &str) -> Result<(), ValidationError> {
    normalize_cidr(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("cidr"))
}

fn validate_cluster_shape(section: &DwhSection) -> Result<(), ValidationError> {
    if section.dwh_cluster_type == ClusterType::MultiNode && section.dwh_num_nodes < 2 {
        return Err(ValidationError::new("multi_node_requires_two_nodes"));
    }
    Ok(())
}

// =============================================================================
//  2. WORKFLOW INPUTS (derived, immutable)
// =============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub key: String,
    pub secret: String,
    pub region: String,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("key", &self.key)
            .field("secret", &"***")
            .field("region", &self.region)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterShape {
    pub cluster_type: ClusterType,
    pub num_nodes: u32,
    pub node_type: String,
    pub identifier: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseParams {
    pub name: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

impl fmt::Debug for DatabaseParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseParams")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("port", &self.port)
            .finish()
    }
}

/// Operator flags: treat an existing resource as satisfying the requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReuseFlags {
    pub existing_role: bool,
    pub existing_network_rule: bool,
}

/// Everything the provisioning workflow needs, resolved once at start-up.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub credentials: AwsCredentials,
    pub shape: ClusterShape,
    pub database: DatabaseParams,
    pub role_name: String,
    pub caller_cidr: String,
    pub reuse: ReuseFlags,
}

impl ClusterConfig {
    pub fn from_document(doc: &DwhConfig, reuse: ReuseFlags) -> Result<Self, DomainError> {
        let caller_cidr = normalize_cidr(&doc.local.out_ip).ok_or_else(|| {
            DomainError::IncompleteConfig(format!(
                "LOCAL.out_ip '{}' is not an IP address or CIDR block",
                doc.local.out_ip
            ))
        })?;

        Ok(Self {
            credentials: AwsCredentials {
                key: doc.aws.key.clone(),
                secret: doc.aws.secret.clone(),
                region: doc.aws.region.clone(),
            },
            shape: ClusterShape {
                cluster_type: doc.dwh.dwh_cluster_type,
                num_nodes: doc.dwh.dwh_num_nodes,
                node_type: doc.dwh.dwh_node_type.clone(),
                identifier: doc.dwh.dwh_cluster_identifier.clone(),
            },
            database: database_params(&doc.dwh),
            role_name: doc.dwh.dwh_iam_role_name.clone(),
            caller_cidr,
            reuse,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub log_data: String,
    pub log_jsonpath: String,
    pub song_data: String,
}

/// Explicit inputs of the ELT runner and of the statement builder.
#[derive(Debug, Clone)]
pub struct EltConfig {
    pub engine: Engine,
    pub duckdb_path: String,
    pub endpoint: Option<String>,
    pub database: DatabaseParams,
    pub schema: String,
    pub role_arn: Option<String>,
    pub storage: StoragePaths,
}

impl EltConfig {
    /// Redshift runs need the provisioning outputs; local DuckDB runs do not.
    pub fn from_document(doc: &DwhConfig) -> Result<Self, DomainError> {
        let endpoint = doc.dwh.dwh_endpoint.clone().filter(|v| !v.is_empty());
        let role_arn = doc.dwh.dwh_s3_iam_arn.clone().filter(|v| !v.is_empty());

        if doc.etl.engine == Engine::Redshift {
            if endpoint.is_none() {
                return Err(DomainError::IncompleteConfig(format!(
                    "{}.{} is missing",
                    DWH_SECTION, ENDPOINT_OPTION
                )));
            }
            if role_arn.is_none() {
                return Err(DomainError::IncompleteConfig(format!(
                    "{}.{} is missing",
                    DWH_SECTION, ROLE_ARN_OPTION
                )));
            }
        }

        Ok(Self {
            engine: doc.etl.engine,
            duckdb_path: doc.etl.duckdb_path.clone(),
            endpoint,
            database: database_params(&doc.dwh),
            schema: doc.dwh.dwh_schema.clone(),
            role_arn,
            storage: StoragePaths {
                log_data: doc.s3.log_data.clone(),
                log_jsonpath: doc.s3.log_jsonpath.clone(),
                song_data: doc.s3.song_data.clone(),
            },
        })
    }
}

fn database_params(dwh: &DwhSection) -> DatabaseParams {
    DatabaseParams {
        name: dwh.dwh_db.clone(),
        user: dwh.dwh_db_user.clone(),
        password: dwh.dwh_db_password.clone(),
        port: dwh.dwh_db_port,
    }
}
