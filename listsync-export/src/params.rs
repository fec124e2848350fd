//! Export parameters as supplied by the `parameters` section of the job config.

use crate::error::{ExportError, ExportResult};
use serde::{Deserialize, Serialize};

/// Source column mapped onto the list's `Title` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleColumn {
    pub name: String,
}

/// One explicitly configured column of a new list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSetup {
    /// Source (and internal) column name.
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// `text`, `singleLineText`, `date` or `dateTime`.
    pub col_type: String,
}

/// Schema of a list to create when it does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewListConfig {
    pub title_column: TitleColumn,
    #[serde(default)]
    pub column_setup: Vec<ColumnSetup>,
}

/// Parameters of one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportParams {
    /// e.g. `contoso.sharepoint.com`
    #[serde(default)]
    pub base_host_name: String,
    /// e.g. `/sites/TeamSite`
    #[serde(default)]
    pub site_url_rel_path: String,
    #[serde(default)]
    pub list_name: String,
    #[serde(default)]
    pub list_description: Vec<String>,
    #[serde(default)]
    pub create_new: Vec<NewListConfig>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub export_list_metadata: bool,
}

impl ExportParams {
    /// Fails with the names of all empty mandatory parameters.
    pub fn validate(&self) -> ExportResult<()> {
        let missing: Vec<&str> = [
            ("base_host_name", &self.base_host_name),
            ("list_name", &self.list_name),
            ("site_url_rel_path", &self.site_url_rel_path),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ExportError::Config(format!(
                "missing mandatory parameters: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.list_description.first().map(String::as_str)
    }

    pub fn new_list(&self) -> Option<&NewListConfig> {
        self.create_new.first()
    }

    /// Source column that becomes `Title`, if a new-list config is present.
    pub fn title_source(&self) -> Option<&str> {
        self.new_list().map(|n| n.title_column.name.as_str())
    }

    /// `hostname/path` for messages.
    pub fn site_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_host_name.trim_end_matches('/'),
            self.site_url_rel_path.trim_start_matches('/')
        )
    }
}
