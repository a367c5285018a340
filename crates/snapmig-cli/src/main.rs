mod config;
mod run;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "snapmig",
    version,
    about = "Migrate world snapshots across schema bundle versions"
)]
pub struct Cli {
    /// Schema bundle the snapshots were taken with
    #[arg(long, value_name = "FILE")]
    pub old_bundle: PathBuf,

    /// Freshly compiled schema bundle to migrate onto
    #[arg(long, value_name = "FILE")]
    pub new_bundle: PathBuf,

    /// Directory scanned for *.snapshot files
    #[arg(long, value_name = "DIR")]
    pub artifacts_dir: PathBuf,

    /// Directory migrated snapshots are written to
    #[arg(long, value_name = "DIR")]
    pub target_dir: PathBuf,

    /// File with one class path pattern per line; '#' starts a comment
    #[arg(long, value_name = "FILE")]
    pub allowlist: PathBuf,

    /// Class table with persistence flags and baseline fixtures
    #[arg(long, value_name = "FILE")]
    pub classes: PathBuf,

    /// Also append one JSON report document per snapshot to this file
    #[arg(long, value_name = "FILE")]
    pub json_report: Option<PathBuf>,
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();
    run::run(&cli)
}
