// dwh-core/src/application/engine.rs

use std::time::{Duration, Instant};
use tracing::{debug, error, instrument};

use crate::error::DwhError;
use crate::ports::connector::Connector;

/// Runs one statement and returns how long the engine took to commit it.
#[instrument(
    skip(connector, query),
    fields(engine = connector.engine_name(), query.len = query.len())
)]
pub async fn execute_query(connector: &dyn Connector, query: &str) -> Result<Duration, DwhError> {
    let start = Instant::now();
    debug!("⚡ {}", first_line(query));

    match connector.execute(query).await {
        Ok(()) => {
            let took = start.elapsed();
            debug!("✅ committed in {:.2?}", took);
            Ok(took)
        }
        Err(e) => {
            error!("❌ failed after {:.2?}: {}\n{}", start.elapsed(), e, query);
            Err(e)
        }
    }
}

fn first_line(query: &str) -> &str {
    query.lines().next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::RecordingFactory;
    use anyhow::Result;

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("insert into users\n    select 1"), "insert into users");
        assert_eq!(first_line(""), "");
    }

    #[tokio::test]
    async fn test_error_is_propagated() -> Result<()> {
        let factory = RecordingFactory::failing_on("staging_songs");
        let conn = factory.connector();

        execute_query(&conn, "drop table if exists users").await?;
        assert!(execute_query(&conn, "drop table if exists staging_songs").await.is_err());
        assert_eq!(factory.queries().len(), 2);
        Ok(())
    }
}
