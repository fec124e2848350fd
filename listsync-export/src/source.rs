//! Header-named UTF-8 source tables, read one row at a time.

use crate::error::ExportResult;
use csv::{Reader, ReaderBuilder, StringRecord};
use serde_json::{Map, Value};
use std::fs::File;
use std::path::{Path, PathBuf};

/// A CSV table with a header row.
#[derive(Debug, Clone)]
pub struct SourceTable {
    path: PathBuf,
}

impl SourceTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column names from the header row, in file order.
    pub fn columns(&self) -> ExportResult<Vec<String>> {
        let mut reader = self.reader()?;
        Ok(reader.headers()?.iter().map(String::from).collect())
    }

    /// Streams the data rows in file order.
    pub fn rows(&self) -> ExportResult<SourceRows> {
        let mut reader = self.reader()?;
        let headers = reader.headers()?.clone();
        Ok(SourceRows { reader, headers })
    }

    fn reader(&self) -> ExportResult<Reader<File>> {
        Ok(ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?)
    }
}

/// Iterator over the rows of a [`SourceTable`].
pub struct SourceRows {
    reader: Reader<File>,
    headers: StringRecord,
}

impl Iterator for SourceRows {
    type Item = ExportResult<SourceRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => Some(Ok(SourceRow::from_record(&self.headers, &record))),
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// One source record: column name to value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    fields: Vec<(String, String)>,
}

impl SourceRow {
    /// Missing trailing fields become empty values; surplus fields are dropped.
    fn from_record(headers: &StringRecord, record: &StringRecord) -> Self {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_string(), record.get(i).unwrap_or_default().to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    /// Renames a column in place, keeping its position.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(field) = self.fields.iter_mut().find(|(k, _)| k == from) {
            field.0 = to.to_string();
        }
    }

    /// Drops the given columns.
    pub fn remove_columns(&mut self, columns: &[String]) {
        self.fields.retain(|(k, _)| !columns.contains(k));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field map for a list item create request.
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SourceRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
