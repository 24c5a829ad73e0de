// dwh-core/src/application/inspect.rs

use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use crate::application::ports::TemplateEngine;
use crate::domain::warehouse::{INTEGRITY_CHECKS, LEFTOVER_STAGING_SQL, Table};
use crate::error::DwhError;
use crate::ports::connector::Connector;

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub value: u64,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub counts: Vec<TableCount>,
    pub checks: Vec<CheckOutcome>,
}

impl InspectionReport {
    pub fn healthy(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

/// Row counts of the final tables plus the zero-valued integrity checks.
#[instrument(skip(connector, renderer))]
pub async fn inspect_warehouse(
    connector: &dyn Connector,
    renderer: &dyn TemplateEngine,
    schema: &str,
) -> Result<InspectionReport, DwhError> {
    let mut counts = Vec::with_capacity(Table::FINAL.len());
    for table in Table::FINAL {
        let rows = connector
            .query_scalar(&format!("select count(*) from {}", table.sql_name()))
            .await?;
        counts.push(TableCount {
            table: table.label(),
            rows,
        });
    }

    let mut checks = Vec::with_capacity(INTEGRITY_CHECKS.len() + 1);
    for check in INTEGRITY_CHECKS {
        let value = connector.query_scalar(check.sql).await?;
        checks.push(CheckOutcome {
            name: check.name.to_string(),
            value,
            passed: check.passes(value),
        });
    }

    let leftover_sql = renderer.render(LEFTOVER_STAGING_SQL, &json!({ "schema": schema }))?;
    let leftover = connector.query_scalar(&leftover_sql).await?;
    checks.push(CheckOutcome {
        name: "leftover staging tables".to_string(),
        value: leftover,
        passed: leftover == 0,
    });

    Ok(InspectionReport { counts, checks })
}
