//! SharePoint list and column definitions as sent to / received from Graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Columns SharePoint adds to every list; never part of an export.
pub const SYSTEM_LIST_COLUMNS: [&str; 11] = [
    "ComplianceAssetId",
    "ContentType",
    "Attachments",
    "Edit",
    "LinkTitleNoMenu",
    "LinkTitle",
    "DocIcon",
    "ItemChildCount",
    "FolderChildCount",
    "AppAuthor",
    "AppEditor",
];

/// The mandatory primary display field of every generic list.
pub const TITLE_COLUMN: &str = "Title";

/// Returns true for SharePoint system columns and hidden `_`-prefixed columns.
pub fn is_system_column(name: &str) -> bool {
    name.starts_with('_') || SYSTEM_LIST_COLUMNS.contains(&name)
}

/// Plain-text column payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextColumn {
    pub allow_multiple_lines: bool,
    pub append_changes_to_existing_text: bool,
    pub lines_for_editing: u32,
    pub max_length: u32,
    pub text_type: String,
}

impl Default for TextColumn {
    fn default() -> Self {
        Self {
            allow_multiple_lines: true,
            append_changes_to_existing_text: false,
            lines_for_editing: 1,
            max_length: 255,
            text_type: "plain".to_string(),
        }
    }
}

impl TextColumn {
    pub fn single_line() -> Self {
        Self {
            allow_multiple_lines: false,
            ..Default::default()
        }
    }
}

/// Date/time column payload. `format` is `dateOnly` or `dateTime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeColumn {
    pub display_as: String,
    pub format: String,
}

impl DateTimeColumn {
    pub fn date_only() -> Self {
        Self {
            display_as: "default".to_string(),
            format: "dateOnly".to_string(),
        }
    }

    pub fn date_time() -> Self {
        Self {
            display_as: "default".to_string(),
            format: "dateTime".to_string(),
        }
    }
}

/// Type-specific payload of a column; serialized as `"text": {..}` or `"dateTime": {..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKind {
    Text(TextColumn),
    DateTime(DateTimeColumn),
}

/// Column types that can be requested when creating a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Multi-line plain text.
    Text,
    SingleLineText,
    /// Same representation as `DateTime`, displayed without the time part.
    Date,
    DateTime,
}

/// A `col_type` value that no [`ColumnType`] corresponds to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported column type: {0}")]
pub struct UnsupportedColumnType(pub String);

impl FromStr for ColumnType {
    type Err = UnsupportedColumnType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "singleLineText" => Ok(Self::SingleLineText),
            "date" => Ok(Self::Date),
            "dateTime" => Ok(Self::DateTime),
            other => Err(UnsupportedColumnType(other.to_string())),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::SingleLineText => "singleLineText",
            Self::Date => "date",
            Self::DateTime => "dateTime",
        };
        f.write_str(s)
    }
}

impl ColumnType {
    /// Builds the default payload for this column type.
    pub fn kind(self) -> ColumnKind {
        match self {
            Self::Text => ColumnKind::Text(TextColumn::default()),
            Self::SingleLineText => ColumnKind::Text(TextColumn::single_line()),
            Self::Date => ColumnKind::DateTime(DateTimeColumn::date_only()),
            Self::DateTime => ColumnKind::DateTime(DateTimeColumn::date_time()),
        }
    }
}

/// Column definition used when creating a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
}

impl ColumnDefinition {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            kind: column_type.kind(),
            hidden: false,
            required: false,
            read_only: false,
        }
    }

    /// Default multi-line text column whose display name equals its name.
    pub fn text(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, "", ColumnType::Text)
    }
}

/// List-level settings of a new list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInfo {
    pub content_types_enabled: bool,
    pub hidden: bool,
    pub template: String,
}

impl Default for ListInfo {
    fn default() -> Self {
        Self {
            content_types_enabled: false,
            hidden: false,
            template: "genericList".to_string(),
        }
    }
}

/// Request body for list creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDefinition {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub list: ListInfo,
}

impl ListDefinition {
    pub fn new(display_name: impl Into<String>, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            display_name: display_name.into(),
            description: None,
            columns,
            list: ListInfo::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }
}

/// A column of an existing list, as returned by `expand=columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListColumn {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl ListColumn {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            required: false,
            read_only: false,
            hidden: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_column_serializes_under_text_key() {
        let col = ColumnDefinition::text("Amount");
        let v = serde_json::to_value(&col).unwrap();
        assert_eq!(v["name"], "Amount");
        assert_eq!(v["displayName"], "Amount");
        assert_eq!(v["text"]["allowMultipleLines"], true);
        assert_eq!(v["text"]["textType"], "plain");
        assert!(v.get("dateTime").is_none());
    }

    #[test]
    fn date_and_datetime_differ_only_in_format() {
        let date = serde_json::to_value(ColumnDefinition::new("d", "D", "", ColumnType::Date)).unwrap();
        let dt = serde_json::to_value(ColumnDefinition::new("d", "D", "", ColumnType::DateTime)).unwrap();
        assert_eq!(date["dateTime"]["format"], "dateOnly");
        assert_eq!(dt["dateTime"]["format"], "dateTime");
        assert_eq!(date["dateTime"]["displayAs"], dt["dateTime"]["displayAs"]);
    }

    #[test]
    fn column_type_parsing() {
        assert_eq!("text".parse::<ColumnType>(), Ok(ColumnType::Text));
        assert_eq!("dateTime".parse::<ColumnType>(), Ok(ColumnType::DateTime));
        assert_eq!(
            "number".parse::<ColumnType>(),
            Err(UnsupportedColumnType("number".to_string()))
        );
    }

    #[test]
    fn list_definition_body() {
        let def = ListDefinition::new("Orders", vec![ColumnDefinition::text("Code")])
            .with_description("");
        let v = serde_json::to_value(&def).unwrap();
        assert_eq!(v["displayName"], "Orders");
        assert!(v.get("description").is_none());
        assert_eq!(
            v["list"],
            json!({"contentTypesEnabled": false, "hidden": false, "template": "genericList"})
        );
    }

    #[test]
    fn system_columns_detected() {
        assert!(is_system_column("ContentType"));
        assert!(is_system_column("_UIVersionString"));
        assert!(!is_system_column("Title"));
    }

    #[test]
    fn list_column_tolerates_missing_fields() {
        let col: ListColumn = serde_json::from_value(json!({"name": "Code"})).unwrap();
        assert_eq!(col.name, "Code");
        assert!(!col.required);
        assert!(col.display_name.is_empty());
    }
}
