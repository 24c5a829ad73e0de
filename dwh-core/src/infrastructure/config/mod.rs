pub mod document;
pub mod store;

pub use crate::domain::config::DwhConfig;
pub use document::load_config;
pub use store::YamlConfigStore;
