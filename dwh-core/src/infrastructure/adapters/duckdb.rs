// dwh-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::{Config, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::error::DwhError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::{ConnectionFactory, Connector};

pub struct DuckDBConnector {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDBConnector {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DwhError> {
        self.conn.lock().map_err(|_| {
            DwhError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "DuckDB Mutex Poisoned",
            )))
        })
    }
}

fn db_error(e: duckdb::Error) -> DwhError {
    DwhError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
}

#[async_trait]
impl Connector for DuckDBConnector {
    async fn execute(&self, query: &str) -> Result<(), DwhError> {
        let conn = self.lock()?;
        conn.execute_batch(query).map_err(db_error)
    }

    async fn query_scalar(&self, query: &str) -> Result<u64, DwhError> {
        let conn = self.lock()?;
        let value: i64 = conn
            .query_row(query, [], |row| row.get(0))
            .map_err(db_error)?;

        u64::try_from(value)
            .map_err(|_| DwhError::InternalError(format!("negative count {} returned", value)))
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}

/// Opens the local database file; every call yields an independent connection.
pub struct DuckDbConnectionFactory {
    path: String,
}

impl DuckDbConnectionFactory {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConnectionFactory for DuckDbConnectionFactory {
    async fn connect(&self, schema: Option<&str>) -> Result<Box<dyn Connector>, DwhError> {
        let connector = DuckDBConnector::new(&self.path)?;
        if let Some(schema) = schema {
            debug!(schema, "Switching DuckDB default schema");
            connector.execute(&format!("set schema = '{}'", schema)).await?;
        }
        Ok(Box::new(connector))
    }
}
