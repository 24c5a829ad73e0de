// dwh-core/src/infrastructure/adapters/postgres.rs
//
// Redshift speaks the PostgreSQL wire protocol. Statements go through the
// simple-query path so each one runs in its own implicit transaction.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::domain::config::DatabaseParams;
use crate::error::DwhError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::connector::{ConnectionFactory, Connector};

pub struct PostgresConnector {
    conn: Mutex<PgConnection>,
}

impl PostgresConnector {
    #[instrument(skip(database), fields(db = %database.name))]
    pub async fn connect(
        host: &str,
        database: &DatabaseParams,
        schema: Option<&str>,
    ) -> Result<Self, InfrastructureError> {
        let options = PgConnectOptions::new()
            .host(host)
            .port(database.port)
            .username(&database.user)
            .password(&database.password)
            .database(&database.name);

        let mut conn = PgConnection::connect_with(&options).await?;
        if let Some(schema) = schema {
            sqlx::raw_sql(&format!("set search_path to {}", schema))
                .execute(&mut conn)
                .await?;
        }
        info!("Connected to {}:{}", host, database.port);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    async fn execute(&self, query: &str) -> Result<(), DwhError> {
        let mut conn = self.conn.lock().await;
        sqlx::raw_sql(query)
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(|e| DwhError::Infrastructure(e.into()))
    }

    async fn query_scalar(&self, query: &str) -> Result<u64, DwhError> {
        let mut conn = self.conn.lock().await;
        let value = sqlx::query_scalar::<_, i64>(query)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| DwhError::Infrastructure(e.into()))?;

        u64::try_from(value)
            .map_err(|_| DwhError::InternalError(format!("negative count {} returned", value)))
    }

    fn engine_name(&self) -> &str {
        "redshift"
    }
}

/// Opens connections to the provisioned cluster endpoint.
pub struct PostgresConnectionFactory {
    host: String,
    database: DatabaseParams,
}

impl PostgresConnectionFactory {
    pub fn new(host: impl Into<String>, database: DatabaseParams) -> Self {
        Self {
            host: host.into(),
            database,
        }
    }
}

#[async_trait]
impl ConnectionFactory for PostgresConnectionFactory {
    async fn connect(&self, schema: Option<&str>) -> Result<Box<dyn Connector>, DwhError> {
        let connector = PostgresConnector::connect(&self.host, &self.database, schema).await?;
        Ok(Box::new(connector))
    }
}
