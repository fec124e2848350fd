//! listsync: replaces the contents of a SharePoint list with a table.
//!
//! Usage:
//!   listsync [DEBUG] --data-dir /data
//!
//! Reads `config.json` and `in/tables/` from the data directory. Any fatal
//! error exits with status 1.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use listsync_cli::config::JobConfig;
use listsync_cli::run_job;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "listsync")]
#[command(about = "Export a table into a SharePoint list")]
struct Args {
    /// Any value enables debug logging
    debug: Option<String>,

    /// Directory holding config.json and the input tables
    #[arg(long, env = "KBC_DATADIR", default_value = "/data")]
    data_dir: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = JobConfig::load(&args.data_dir);
    let debug = args.debug.is_some() || config.as_ref().is_ok_and(JobConfig::debug);
    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Loading configuration...");
    let result = async {
        let config = config.context("loading configuration")?;
        config
            .validate(&args.data_dir)
            .context("invalid configuration")?;
        run_job(&config, &args.data_dir).await
    }
    .await;

    let report = result?;
    info!(
        "Export finished! {} rows written to {}",
        report.written_rows,
        report.list.display_name.as_deref().unwrap_or(&report.list.name)
    );
    Ok(())
}
