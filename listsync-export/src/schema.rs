//! Source/destination column reconciliation and new-list schema derivation.

use crate::error::{SchemaError, SchemaResult};
use crate::params::NewListConfig;
use listsync_graph::{
    ColumnDefinition, ColumnType, ListColumn, ListDefinition, TITLE_COLUMN, UnsupportedColumnType,
};
use std::collections::HashMap;

/// Makes display names unique by suffixing every member of a colliding
/// group with `_<internal name>`.
///
/// Repeats until no collisions remain, so a second call is a no-op when
/// internal names are unique.
pub fn dedupe_display_names(columns: &mut [ListColumn]) {
    for _ in 0..=columns.len() {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for col in columns.iter() {
            *counts.entry(col.display_name.clone()).or_default() += 1;
        }

        let mut renamed = false;
        for col in columns.iter_mut() {
            if counts[&col.display_name] > 1 {
                col.display_name = format!("{}_{}", col.display_name, col.name);
                renamed = true;
            }
        }
        if !renamed {
            return;
        }
    }
}

/// Checks that the source table can be written into the destination.
///
/// Returns the source columns that have no destination column; they are
/// dropped from every row. With a title mapping, the mapped source column
/// stands in for `Title` and is never reported as nonexistent.
pub fn reconcile(
    source: &[String],
    destination: &[String],
    required: &[String],
    title_source: Option<&str>,
) -> SchemaResult<Vec<String>> {
    if let Some(title) = title_source {
        if !source.iter().any(|c| c == title) {
            return Err(SchemaError::TitleColumnMissing(title.to_string()));
        }
    }

    let effective: Vec<&str> = source
        .iter()
        .map(|c| match title_source {
            Some(title) if c == title => TITLE_COLUMN,
            _ => c.as_str(),
        })
        .collect();

    let missing: Vec<String> = required
        .iter()
        .filter(|r| !effective.contains(&r.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingRequired(missing));
    }

    Ok(source
        .iter()
        .filter(|c| Some(c.as_str()) != title_source)
        .filter(|c| !destination.contains(c))
        .cloned()
        .collect())
}

/// [`reconcile`] against the columns of an existing list.
pub fn reconcile_with_list(
    source: &[String],
    list_columns: &[ListColumn],
    title_source: Option<&str>,
) -> SchemaResult<Vec<String>> {
    let destination: Vec<String> = list_columns.iter().map(|c| c.name.clone()).collect();
    let required: Vec<String> = list_columns
        .iter()
        .filter(|c| c.required)
        .map(|c| c.name.clone())
        .collect();
    reconcile(source, &destination, &required, title_source)
}

/// Builds a list definition from the new-list config: one column per
/// configured column plus a plain-text column for every other source column.
pub fn build_list_definition(
    list_name: &str,
    description: Option<&str>,
    config: &NewListConfig,
    source: &[String],
) -> SchemaResult<ListDefinition> {
    let configured: Vec<String> = config.column_setup.iter().map(|c| c.name.clone()).collect();
    let defaults = reconcile(source, &configured, &[], Some(config.title_column.name.as_str()))?;

    let mut columns = Vec::with_capacity(configured.len() + defaults.len());
    for setup in &config.column_setup {
        let column_type: ColumnType = setup
            .col_type
            .parse()
            .map_err(|e: UnsupportedColumnType| SchemaError::UnsupportedColumnType(e.0))?;
        columns.push(ColumnDefinition::new(
            &setup.name,
            &setup.display_name,
            &setup.description,
            column_type,
        ));
    }
    columns.extend(defaults.into_iter().map(ColumnDefinition::text));

    Ok(ListDefinition::new(list_name, columns).with_description(description.unwrap_or_default()))
}
