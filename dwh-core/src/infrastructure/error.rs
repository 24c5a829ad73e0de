// dwh-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(dwh::infra::database::duckdb),
        help("An error occurred inside the local SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("Redshift Error: {0}")]
    #[diagnostic(
        code(dwh::infra::database::redshift),
        help("Check the endpoint, credentials and that your IP is allowed by the cluster security group.")
    )]
    Postgres(#[from] sqlx::Error),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(dwh::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(dwh::infra::yaml),
        help("Check your YAML syntax and that every required option is present.")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(dwh::infra::config_invalid))]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Configuration file not found at '{0}'")]
    #[diagnostic(code(dwh::infra::config_missing))]
    ConfigNotFound(String),

    // --- TEMPLATING ---
    #[error("Template Rendering Error: {0}")]
    #[diagnostic(code(dwh::infra::template))]
    TemplateError(#[from] minijinja::Error),
}

impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}

impl From<sqlx::Error> for InfrastructureError {
    fn from(err: sqlx::Error) -> Self {
        InfrastructureError::Database(DatabaseError::Postgres(err))
    }
}
