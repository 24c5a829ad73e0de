// dwh-core/src/infrastructure/config/store.rs

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::domain::ports::{ConfigStore, PersistOutcome};
use crate::error::DwhError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

/// Writes provisioning outputs back into the YAML configuration file.
///
/// The file is re-read on every call so that values written by a previous
/// call (or by hand in between) are seen. No locking: last writer wins.
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Mapping, InfrastructureError> {
        let content = fs::read_to_string(&self.path)?;
        match serde_yaml::from_str::<Value>(&content)? {
            Value::Mapping(map) => Ok(map),
            Value::Null => Ok(Mapping::new()),
            _ => Err(InfrastructureError::ConfigError(format!(
                "{} is not a mapping of sections",
                self.path.display()
            ))),
        }
    }
}

impl ConfigStore for YamlConfigStore {
    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    fn persist_option(
        &self,
        section: &str,
        option: &str,
        value: &str,
    ) -> Result<PersistOutcome, DwhError> {
        let mut document = self.read_document()?;

        let section_key = Value::String(section.to_string());
        let entry = document
            .entry(section_key)
            .or_insert_with(|| Value::Mapping(Mapping::new()));

        if entry.is_null() {
            *entry = Value::Mapping(Mapping::new());
        }
        let section_map = entry.as_mapping_mut().ok_or_else(|| {
            InfrastructureError::ConfigError(format!("Section '{}' is not a mapping", section))
        })?;

        let option_key = Value::String(option.to_string());
        if let Some(existing) = section_map.get(&option_key).filter(|v| !v.is_null()) {
            let existing = match existing {
                Value::String(s) => s.clone(),
                other => serde_yaml::to_string(other)
                    .map_err(InfrastructureError::YamlError)?
                    .trim_end()
                    .to_string(),
            };
            warn!(section, option, "Option already set, leaving it untouched");
            return Ok(PersistOutcome::AlreadyPresent { existing });
        }

        section_map.insert(option_key, Value::String(value.to_string()));

        let content = serde_yaml::to_string(&Value::Mapping(document))
            .map_err(InfrastructureError::YamlError)?;
        atomic_write(&self.path, content)?;
        info!(section, option, "Option persisted");

        Ok(PersistOutcome::Written)
    }
}
