// dwh-core/src/application/statements.rs

use serde::Serialize;
use serde_json::{Value, json};

use crate::application::etl::EltPhase;
use crate::application::ports::TemplateEngine;
use crate::domain::config::{EltConfig, Engine};
use crate::domain::warehouse::Table;
use crate::domain::warehouse::tables::{SCHEMA_CREATE, TABLE_DROP};
use crate::error::DwhError;

/// Every statement of one ELT run, rendered up front from an explicit `EltConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementPlan {
    pub create_schema: String,
    pub drop_tables: Vec<String>,
    pub create_tables: Vec<String>,
    pub load_staging: Vec<String>,
    pub insert_final: Vec<String>,
    pub drop_staging: Vec<String>,
}

impl StatementPlan {
    pub fn build(renderer: &dyn TemplateEngine, config: &EltConfig) -> Result<Self, DwhError> {
        let context = template_context(config);
        let render = |template: &str| renderer.render(template, &context);
        let drop_table =
            |table: &Table| renderer.render(TABLE_DROP, &json!({ "table": table.sql_name() }));

        let load_staging = Table::STAGING
            .iter()
            .filter_map(|t| t.load_template())
            .map(render)
            .collect::<Result<Vec<_>, _>>()?;

        let insert_final = Table::FINAL
            .iter()
            .filter_map(|t| t.insert_template())
            .map(render)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            create_schema: render(SCHEMA_CREATE)?,
            drop_tables: Table::ALL.iter().map(drop_table).collect::<Result<_, _>>()?,
            create_tables: Table::ALL
                .iter()
                .map(|t| render(t.create_template()))
                .collect::<Result<_, _>>()?,
            load_staging,
            insert_final,
            drop_staging: Table::STAGING.iter().map(drop_table).collect::<Result<_, _>>()?,
        })
    }

    /// Batches run on the schema-scoped connection, in order.
    pub fn batches(&self) -> [(EltPhase, &[String]); 5] {
        [
            (EltPhase::DropTables, self.drop_tables.as_slice()),
            (EltPhase::CreateTables, self.create_tables.as_slice()),
            (EltPhase::LoadStaging, self.load_staging.as_slice()),
            (EltPhase::InsertFinal, self.insert_final.as_slice()),
            (EltPhase::DropStaging, self.drop_staging.as_slice()),
        ]
    }

    pub fn statement_count(&self) -> usize {
        1 + self.batches().iter().map(|(_, s)| s.len()).sum::<usize>()
    }
}

fn template_context(config: &EltConfig) -> Value {
    json!({
        "schema": config.schema,
        "redshift": config.engine == Engine::Redshift,
        "role_arn": config.role_arn.clone().unwrap_or_default(),
        "log_data": config.storage.log_data,
        "log_jsonpath": config.storage.log_jsonpath,
        "song_data": config.storage.song_data,
    })
}
