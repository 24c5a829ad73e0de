// dwh-core/src/domain/ports/config_store.rs

use crate::error::DwhError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Written,
    /// The option already held a value; nothing was overwritten.
    AlreadyPresent { existing: String },
}

/// Write-back side of the configuration file.
pub trait ConfigStore: Send + Sync {
    /// Creates `section` if needed; never replaces an existing `option`.
    fn persist_option(
        &self,
        section: &str,
        option: &str,
        value: &str,
    ) -> Result<PersistOutcome, DwhError>;
}
