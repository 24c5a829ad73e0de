// dwh/src/commands/inspect.rs
//
// USE CASE: Row counts and integrity checks of the loaded warehouse.

use comfy_table::Table;
use std::path::PathBuf;

use dwh_core::application::inspect_warehouse;
use dwh_core::domain::config::EltConfig;
use dwh_core::infrastructure::compiler::jinja::JinjaRenderer;

pub async fn execute(config_path: PathBuf) -> anyhow::Result<()> {
    let document = super::load(&config_path)?;
    let elt = EltConfig::from_document(&document).map_err(super::diagnose)?;
    super::require_local_database(&elt)?;

    let factory = super::connection_factory(&elt)?;
    let conn = factory.connect(Some(&elt.schema)).await?;

    println!("\n🔍 Inspecting schema '{}'", elt.schema);
    let report = inspect_warehouse(conn.as_ref(), &JinjaRenderer::new(), &elt.schema).await?;

    let mut counts = Table::new();
    counts.set_header(vec!["Table", "Rows"]);
    for count in &report.counts {
        counts.add_row(vec![count.table.to_string(), count.rows.to_string()]);
    }
    println!("{counts}");

    let mut checks = Table::new();
    checks.set_header(vec!["Check", "Value", "Status"]);
    for check in &report.checks {
        let status = if check.passed { "✅" } else { "❌" };
        checks.add_row(vec![check.name.clone(), check.value.to_string(), status.to_string()]);
    }
    println!("{checks}");

    if !report.healthy() {
        eprintln!("\n💥 Integrity checks failed.");
        std::process::exit(1);
    }
    Ok(())
}
