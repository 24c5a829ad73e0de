// dwh-core/src/domain/ports/mod.rs

pub mod config_store;

pub use config_store::{ConfigStore, PersistOutcome};
