// dwh-core/src/domain/warehouse/mod.rs

pub mod checks;
pub mod tables;

pub use checks::{INTEGRITY_CHECKS, IntegrityCheck, LEFTOVER_STAGING_SQL};
pub use tables::Table;
