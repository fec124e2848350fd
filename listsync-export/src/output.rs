//! List metadata output table.

use crate::error::ExportResult;
use listsync_graph::ListHandle;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the metadata table under the output tables directory.
pub const LIST_METADATA_TABLE: &str = "lists_metadata.csv";

/// Columns of the metadata table, in output order.
pub const LIST_METADATA_COLUMNS: &[&str] = &[
    "createdDateTime",
    "description",
    "eTag",
    "id",
    "lastModifiedDateTime",
    "name",
    "webUrl",
    "displayName",
    "createdBy_user",
    "createdBy_email",
    "lastModifiedBy_user",
    "lastModifiedBy_email",
    "site_id",
];

/// Writes list metadata rows as CSV, one row per list.
pub struct ListMetadataWriter {
    path: PathBuf,
}

impl ListMetadataWriter {
    /// Writer for `<tables_dir>/lists_metadata.csv`.
    pub fn new(tables_dir: impl AsRef<Path>) -> Self {
        Self {
            path: tables_dir.as_ref().join(LIST_METADATA_TABLE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, site_id: &str, lists: &[ListHandle]) -> ExportResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut wtr = csv::Writer::from_path(&self.path)?;
        wtr.write_record(LIST_METADATA_COLUMNS)?;
        for list in lists {
            wtr.write_record(metadata_row(site_id, list))?;
        }
        wtr.flush()?;

        debug!("Wrote metadata of {} lists to {}", lists.len(), self.path.display());
        Ok(())
    }
}

fn metadata_row(site_id: &str, list: &ListHandle) -> Vec<String> {
    let meta = |key: &str| list.metadata.get(key).map(scalar).unwrap_or_default();
    let user = |key: &str, field: &str| {
        list.metadata
            .get(key)
            .and_then(|v| v.pointer(&format!("/user/{field}")))
            .map(scalar)
            .unwrap_or_default()
    };

    vec![
        meta("createdDateTime"),
        meta("description"),
        meta("eTag"),
        list.id.clone(),
        meta("lastModifiedDateTime"),
        list.name.clone(),
        meta("webUrl"),
        list.display_name.clone().unwrap_or_default(),
        user("createdBy", "displayName"),
        user("createdBy", "email"),
        user("lastModifiedBy", "displayName"),
        user("lastModifiedBy", "email"),
        site_id.to_string(),
    ]
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
