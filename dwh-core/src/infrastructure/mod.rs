// dwh-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod clock;
pub mod compiler;
pub mod config;
pub mod error;
pub mod fs;
