// dwh/src/cli.rs
//
// Every command line definition of the `dwh` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dwh")]
#[command(about = "Provision a Redshift warehouse and load the song-play star schema", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ☁️  Creates the IAM role, the Redshift cluster and the ingress rule
    Provision {
        /// Configuration file (YAML)
        #[arg(long, short, env = "DWH_CONFIG")]
        config: PathBuf,

        /// Use an already existing IAM role to access S3
        #[arg(long, short = 'r')]
        reuse_role: bool,

        /// Accept an already existing ingress rule for this IP
        #[arg(long, short = 'v')]
        reuse_network_rule: bool,

        /// Give up waiting for the cluster after this many seconds
        #[arg(long)]
        wait_timeout: Option<u64>,

        /// Seconds between the first two availability checks (doubles up to a minute)
        #[arg(long, default_value = "10")]
        poll_interval: u64,
    },

    /// 🚚 Creates the star schema and loads it from the staging files
    Etl {
        /// Configuration file (YAML)
        #[arg(long, short, env = "DWH_CONFIG")]
        config: PathBuf,

        /// Print the rendered statements without connecting
        #[arg(long)]
        dry_run: bool,
    },

    /// 🔍 Row counts and integrity checks of the loaded warehouse
    Inspect {
        /// Configuration file (YAML)
        #[arg(long, short, env = "DWH_CONFIG")]
        config: PathBuf,
    },
}
