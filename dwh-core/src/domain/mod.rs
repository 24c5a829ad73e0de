// dwh-core/src/domain/mod.rs

pub mod cluster;
pub mod config;
pub mod error;
pub mod ports;
pub mod provisioning;
pub mod warehouse;

pub use error::{DomainError, ProviderError};
