// dwh-core/src/application/etl.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::application::engine::execute_query;
use crate::application::statements::StatementPlan;
use crate::error::DwhError;
use crate::ports::connector::{ConnectionFactory, Connector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EltPhase {
    CreateSchema,
    DropTables,
    CreateTables,
    LoadStaging,
    InsertFinal,
    DropStaging,
}

impl fmt::Display for EltPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EltPhase::CreateSchema => "create schema",
            EltPhase::DropTables => "drop tables",
            EltPhase::CreateTables => "create tables",
            EltPhase::LoadStaging => "load staging",
            EltPhase::InsertFinal => "insert final",
            EltPhase::DropStaging => "drop staging",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub phase: EltPhase,
    pub statements: usize,
    pub millis: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlReport {
    pub success: bool,
    pub engine: String,
    pub completed: Vec<EltPhase>,
    pub timings: Vec<PhaseTiming>,
    pub statements_executed: usize,
    pub failed_phase: Option<EltPhase>,
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl EtlReport {
    fn new() -> Self {
        Self {
            success: false,
            engine: String::new(),
            completed: Vec::new(),
            timings: Vec::new(),
            statements_executed: 0,
            failed_phase: None,
            error: None,
            finished_at: Utc::now(),
        }
    }

    fn record(&mut self, phase: EltPhase, statements: usize, took: Duration) {
        self.statements_executed += statements;
        self.completed.push(phase);
        self.timings.push(PhaseTiming {
            phase,
            statements,
            millis: took.as_millis(),
        });
    }

    fn fail(mut self, phase: EltPhase, err: DwhError) -> Self {
        error!(%phase, "ELT aborted: {}", err);
        self.failed_phase = Some(phase);
        self.error = Some(err.to_string());
        self.finished_at = Utc::now();
        self
    }
}

/// Runs the plan one statement at a time; each statement is committed on its own.
///
/// The first connection only creates the schema. The second one has it as the
/// active schema for every following batch. Any failure stops the run; already
/// committed statements stay committed.
#[instrument(skip(factory, plan))]
pub async fn run_etl(
    factory: &dyn ConnectionFactory,
    plan: &StatementPlan,
    schema: &str,
) -> EtlReport {
    let mut report = EtlReport::new();

    // 1. SCHEMA
    println!("🏗️  Creating schema '{}'...", schema);
    let bootstrap = match factory.connect(None).await {
        Ok(conn) => conn,
        Err(e) => return report.fail(EltPhase::CreateSchema, e),
    };
    report.engine = bootstrap.engine_name().to_string();
    match execute_query(bootstrap.as_ref(), &plan.create_schema).await {
        Ok(took) => report.record(EltPhase::CreateSchema, 1, took),
        Err(e) => return report.fail(EltPhase::CreateSchema, e),
    }
    drop(bootstrap);

    // 2. BATCHES on the schema-scoped connection
    let conn = match factory.connect(Some(schema)).await {
        Ok(conn) => conn,
        Err(e) => return report.fail(EltPhase::DropTables, e),
    };

    for (phase, statements) in plan.batches() {
        println!("▶️  {} ({} statements)", phase, statements.len());
        let mut executed = 0;
        match run_batch(conn.as_ref(), statements, &mut executed).await {
            Ok(took) => report.record(phase, executed, took),
            Err(e) => {
                report.statements_executed += executed;
                return report.fail(phase, e);
            }
        }
    }

    info!(
        statements = report.statements_executed,
        "ELT finished"
    );
    report.success = true;
    report.finished_at = Utc::now();
    report
}

async fn run_batch(
    conn: &dyn Connector,
    statements: &[String],
    executed: &mut usize,
) -> Result<Duration, DwhError> {
    let mut total = Duration::ZERO;
    for statement in statements {
        total += execute_query(conn, statement).await?;
        *executed += 1;
    }
    Ok(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::fakes::RecordingFactory;
    use crate::domain::config::{EltConfig, Engine};
    use crate::domain::config::tests::sample;
    use crate::infrastructure::compiler::jinja::JinjaRenderer;
    use anyhow::Result;

    fn plan() -> Result<StatementPlan> {
        let mut doc = sample();
        doc.etl.engine = Engine::DuckDb;
        Ok(StatementPlan::build(
            &JinjaRenderer::new(),
            &EltConfig::from_document(&doc)?,
        )?)
    }

    #[tokio::test]
    async fn test_runs_every_statement_in_order() -> Result<()> {
        let plan = plan()?;
        let factory = RecordingFactory::default();

        let report = run_etl(&factory, &plan, "sparkify").await;

        assert!(report.success, "{:?}", report.error);
        assert_eq!(report.statements_executed, plan.statement_count());
        assert_eq!(report.timings.len(), 6);
        assert_eq!(report.timings[4].phase, EltPhase::InsertFinal);
        assert_eq!(report.timings[4].statements, 5);
        assert_eq!(factory.connects(), vec![None, Some("sparkify".to_string())]);

        let queries = factory.queries();
        assert_eq!(queries[0], "create schema if not exists sparkify");
        assert_eq!(queries[1], "drop table if exists staging_events");
        assert_eq!(
            queries[queries.len() - 2..],
            ["drop table if exists staging_events", "drop table if exists staging_songs"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_skips_remaining_steps() -> Result<()> {
        let plan = plan()?;
        let factory = RecordingFactory::failing_on("insert into users");

        let report = run_etl(&factory, &plan, "sparkify").await;

        assert!(!report.success);
        assert_eq!(report.failed_phase, Some(EltPhase::InsertFinal));
        assert_eq!(
            report.completed,
            vec![
                EltPhase::CreateSchema,
                EltPhase::DropTables,
                EltPhase::CreateTables,
                EltPhase::LoadStaging
            ]
        );
        // songplay went through before users failed.
        assert_eq!(report.statements_executed, 1 + 7 + 7 + 2 + 1);
        let queries = factory.queries();
        assert!(queries.last().unwrap().starts_with("insert into users"));
        assert!(!queries.iter().any(|q| q.starts_with("insert into songs")));
        Ok(())
    }
}
