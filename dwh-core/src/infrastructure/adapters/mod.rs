// dwh-core/src/infrastructure/adapters/mod.rs

pub mod aws;
pub mod duckdb;
pub mod ec2;
pub mod iam;
pub mod postgres;
pub mod redshift;
