// dwh/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use clap::error::ErrorKind;
use std::time::Duration;
use tracing::debug;

use cli::{Cli, Commands};
use dwh_core::application::WaitPolicy;
use dwh_core::domain::config::ReuseFlags;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug dwh etl -c dwh.yaml shows every statement
    tracing_subscriber::fmt::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            // Malformed arguments: show usage, do nothing.
            err.print()?;
            return Ok(());
        }
    };

    match cli.command {
        Commands::Provision {
            config,
            reuse_role,
            reuse_network_rule,
            wait_timeout,
            poll_interval,
        } => {
            let reuse = ReuseFlags {
                existing_role: reuse_role,
                existing_network_rule: reuse_network_rule,
            };
            let initial_delay = Duration::from_secs(poll_interval.max(1));
            let policy = WaitPolicy {
                initial_delay,
                max_delay: initial_delay.max(WaitPolicy::default().max_delay),
                timeout: wait_timeout.map(Duration::from_secs),
                ..WaitPolicy::default()
            };
            debug!(?reuse, ?policy, "Provisioning options");
            commands::provision::execute(config, reuse, policy).await?;
        }

        Commands::Etl { config, dry_run } => {
            commands::etl::execute(config, dry_run).await?;
        }

        Commands::Inspect { config } => {
            commands::inspect::execute(config).await?;
        }
    }

    Ok(())
}
