// dwh-core/src/error.rs

use crate::domain::error::{DomainError, ProviderError};
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DwhError {
    // --- DOMAIN (role conflicts, cluster states, network rules) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- CLOUD PROVIDER (raw control-plane rejections) ---
    #[error(transparent)]
    Provider(#[from] ProviderError),

    // --- INFRASTRUCTURE (IO, YAML, SQL, templates) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for DwhError {
    fn from(err: std::io::Error) -> Self {
        DwhError::Infrastructure(InfrastructureError::Io(err))
    }
}
