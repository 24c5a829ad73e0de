// dwh/src/commands/etl.rs
//
// USE CASE: Drop, create and load the star schema.

use std::path::PathBuf;

use dwh_core::application::{StatementPlan, run_etl};
use dwh_core::domain::config::EltConfig;
use dwh_core::infrastructure::compiler::jinja::JinjaRenderer;

pub async fn execute(config_path: PathBuf, dry_run: bool) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    let document = super::load(&config_path)?;
    let elt = EltConfig::from_document(&document).map_err(super::diagnose)?;
    let plan = StatementPlan::build(&JinjaRenderer::new(), &elt)?;

    if dry_run {
        println!("📜 {} statements, nothing executed:\n", plan.statement_count());
        println!("{};", plan.create_schema);
        for (phase, statements) in plan.batches() {
            println!("\n-- {}", phase);
            for statement in statements {
                println!("{};", statement);
            }
        }
        return Ok(());
    }

    let factory = super::connection_factory(&elt)?;
    let report = run_etl(factory.as_ref(), &plan, &elt.schema).await;

    if !report.success {
        eprintln!(
            "\n❌ FAILURE. Step '{}' failed after {} statements: {}",
            report
                .failed_phase
                .map(|p| p.to_string())
                .unwrap_or_default(),
            report.statements_executed,
            report.error.as_deref().unwrap_or("unknown error")
        );
        std::process::exit(1);
    }

    for timing in &report.timings {
        println!(
            "   ➜ {:<14} {:>3} statements {:>8} ms",
            timing.phase.to_string(),
            timing.statements,
            timing.millis
        );
    }
    println!(
        "\n✨ SUCCESS! {} statements executed on {} in {:.2?}",
        report.statements_executed,
        report.engine,
        start.elapsed()
    );
    Ok(())
}
