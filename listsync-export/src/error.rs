//! Error types for the export layer.

use crate::exporter::ExportStage;
use listsync_graph::{BatchOutcome, GraphError};
use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for schema checks.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Source and destination columns cannot be reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Destination-required columns with no source column.
    #[error("some required columns are missing in the source table: {0:?}")]
    MissingRequired(Vec<String>),

    /// The configured title column does not exist in the source table.
    #[error("specified title column \"{0}\" is missing in the source table")]
    TitleColumnMissing(String),

    /// A configured column type has no column definition.
    #[error("unsupported column type: {0}")]
    UnsupportedColumnType(String),
}

/// Errors that abort an export run.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Missing or invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Remote API failure that was not absorbed by retries or token refresh.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Schema validation failed.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The site lookup returned no id.
    #[error("no site with given url: {0} found")]
    SiteNotFound(String),

    /// The list does not exist and no creation config was supplied.
    #[error("no list named \"{list}\" found on site: {site}")]
    ListNotFound { list: String, site: String },

    /// Operations that still failed after recovery.
    #[error("{stage} finished with errors, {} records failed: {}", .failures.len(), describe_failures(.failures))]
    PartialBatchFailure {
        stage: ExportStage,
        failures: Vec<BatchOutcome>,
    },

    /// The source table could not be read.
    #[error("source table error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_failures(failures: &[BatchOutcome]) -> String {
    failures
        .iter()
        .map(|f| format!("{} (HTTP {})", f.id, f.status))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_lists_correlation_ids() {
        let err = ExportError::PartialBatchFailure {
            stage: ExportStage::WriteRows,
            failures: vec![
                BatchOutcome { id: "3".into(), status: 400, body: None },
                BatchOutcome { id: "17".into(), status: 409, body: None },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 records failed"));
        assert!(msg.contains("3 (HTTP 400)"));
        assert!(msg.contains("17 (HTTP 409)"));
    }

    #[test]
    fn schema_error_names_columns() {
        let err = SchemaError::MissingRequired(vec!["D".into()]);
        assert!(err.to_string().contains("\"D\""));
    }
}
