// dwh-core/src/infrastructure/config/document.rs

use std::fs;
use std::path::Path;
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::config::DwhConfig;
use crate::infrastructure::error::InfrastructureError;

/// Loads, layers and validates the configuration file.
///
/// A missing required option fails here, before any client is built.
#[instrument]
pub fn load_config(path: &Path) -> Result<DwhConfig, InfrastructureError> {
    if !path.exists() {
        return Err(InfrastructureError::ConfigNotFound(
            path.display().to_string(),
        ));
    }
    info!(path = ?path, "Loading warehouse configuration");

    let content = fs::read_to_string(path)?;
    let mut config: DwhConfig = serde_yaml::from_str(&content)?;

    apply_env_overrides(&mut config);

    config.validate()?;
    Ok(config)
}

fn apply_env_overrides(config: &mut DwhConfig) {
    // Keeps the password out of the file in CI: DWH_DB_PASSWORD=... dwh etl -c dwh.yaml
    if let Ok(val) = std::env::var("DWH_DB_PASSWORD") {
        info!("Overriding DWH.dwh_db_password via ENV");
        config.dwh.dwh_db_password = val;
    }
    if let Ok(val) = std::env::var("DWH_REGION") {
        info!(old = ?config.aws.region, new = ?val, "Overriding AWS.region via ENV");
        config.aws.region = val;
    }
}
