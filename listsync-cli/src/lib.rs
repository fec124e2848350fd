//! Job runner for the `listsync` binary.

pub mod config;

use anyhow::{Context, Result};
use config::{JobConfig, output_tables_dir};
use listsync_export::{ExportReport, ListExporter, ListMetadataWriter};
use listsync_graph::GraphClient;
use std::path::Path;
use tracing::info;

/// Runs one export job described by an already validated config.
pub async fn run_job(config: &JobConfig, data_dir: &Path) -> Result<ExportReport> {
    let source = config.input_table(data_dir)?;
    let credentials = config.credentials()?;

    let client = GraphClient::connect(config.graph_config(), credentials)
        .await
        .context("authorization failed")?;

    let report = ListExporter::new(&client, &config.parameters)
        .run(&source)
        .await?;

    if config.parameters.export_list_metadata {
        let writer = ListMetadataWriter::new(output_tables_dir(data_dir));
        writer
            .write(&report.site_id, std::slice::from_ref(&report.list))
            .with_context(|| format!("writing {}", writer.path().display()))?;
        info!("List metadata written to {}", writer.path().display());
    }

    Ok(report)
}
