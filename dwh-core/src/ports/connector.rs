// dwh-core/src/ports/connector.rs

// What the ELT runner needs from a database, without knowing whether it talks
// to Redshift over the wire or to a local DuckDB file.

use crate::error::DwhError;
use async_trait::async_trait;

#[async_trait]
pub trait Connector: Send + Sync {
    /// Executes one statement; it is committed when this returns.
    async fn execute(&self, query: &str) -> Result<(), DwhError>;

    /// First column of the first row, as a count.
    async fn query_scalar(&self, query: &str) -> Result<u64, DwhError>;

    fn engine_name(&self) -> &str;
}

#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Opens a fresh connection, with `schema` as the active search path when given.
    async fn connect(&self, schema: Option<&str>) -> Result<Box<dyn Connector>, DwhError>;
}
