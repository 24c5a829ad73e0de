// dwh/src/commands/mod.rs

pub mod etl;
pub mod inspect;
pub mod provision;

use anyhow::{Context, bail};
use std::path::{Path, PathBuf};

use dwh_core::domain::config::{DwhConfig, EltConfig, Engine};
use dwh_core::infrastructure::adapters::duckdb::DuckDbConnectionFactory;
use dwh_core::infrastructure::adapters::postgres::PostgresConnectionFactory;
use dwh_core::infrastructure::config::load_config;
use dwh_core::ports::ConnectionFactory;

/// Prints the diagnostic with its code and help text, then hands over to anyhow.
pub(crate) fn diagnose<E>(err: E) -> anyhow::Error
where
    E: miette::Diagnostic + Send + Sync + 'static,
{
    let message = err.to_string();
    eprintln!("{:?}", miette::Report::new(err));
    anyhow::anyhow!(message)
}

pub(crate) fn load(path: &Path) -> anyhow::Result<DwhConfig> {
    println!("⚙️  Loading configuration from {}...", path.display());
    load_config(path)
        .with_context(|| format!("Could not read the config file {}", path.display()))
}

/// Redshift through the persisted endpoint, or the local DuckDB file.
pub(crate) fn connection_factory(elt: &EltConfig) -> anyhow::Result<Box<dyn ConnectionFactory>> {
    match elt.engine {
        Engine::Redshift => {
            let host = elt
                .endpoint
                .clone()
                .context("DWH.dwh_endpoint is missing; run 'dwh provision' first")?;
            println!("🔌 Engine: Redshift at {}:{}", host, elt.database.port);
            Ok(Box::new(PostgresConnectionFactory::new(
                host,
                elt.database.clone(),
            )))
        }
        Engine::DuckDb => {
            println!("🔌 Engine: DuckDB at {}", elt.duckdb_path);
            Ok(Box::new(DuckDbConnectionFactory::new(&elt.duckdb_path)))
        }
    }
}

pub(crate) fn require_local_database(elt: &EltConfig) -> anyhow::Result<()> {
    if elt.engine == Engine::DuckDb && !PathBuf::from(&elt.duckdb_path).exists() {
        bail!(
            "❌ Database not found at: {}\n👉 Have you run 'dwh etl'?",
            elt.duckdb_path
        );
    }
    Ok(())
}
