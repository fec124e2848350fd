//! End-to-end export run.
//!
//! A run walks a fixed sequence of stages and stops at the first failing one:
//!
//! ```text
//! ResolveSite → ResolveOrCreateList → ReconcileSchema → EmptyList → WriteRows → Done
//! ```
//!
//! There is no rollback. A run that fails while emptying or writing leaves
//! the list partially emptied or partially written.

use crate::error::{ExportError, ExportResult};
use crate::params::ExportParams;
use crate::recovery::recover_failed_deletes;
use crate::schema::{build_list_definition, dedupe_display_names, reconcile_with_list};
use crate::source::SourceTable;
use futures::TryStreamExt;
use listsync_graph::{
    BatchOperation, BatchOutcome, GraphClient, ListColumn, ListHandle, MAX_BATCH_SIZE, TITLE_COLUMN,
};
use std::fmt;
use tracing::{debug, info, warn};

/// Stage of an export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    ResolveSite,
    ResolveOrCreateList,
    ReconcileSchema,
    EmptyList,
    WriteRows,
    Done,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolveSite => "Resolve site",
            Self::ResolveOrCreateList => "Resolve or create list",
            Self::ReconcileSchema => "Reconcile schema",
            Self::EmptyList => "Empty list",
            Self::WriteRows => "Write rows",
            Self::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub site_id: String,
    pub list: ListHandle,
    pub list_created: bool,
    /// Destination columns after display-name deduplication.
    pub columns: Vec<ListColumn>,
    /// Source columns dropped because the list has no such column.
    pub pruned_columns: Vec<String>,
    pub deleted_items: usize,
    pub written_rows: usize,
}

/// Replaces the contents of one SharePoint list with the rows of a source table.
pub struct ListExporter<'a> {
    client: &'a GraphClient,
    params: &'a ExportParams,
}

impl<'a> ListExporter<'a> {
    pub fn new(client: &'a GraphClient, params: &'a ExportParams) -> Self {
        Self { client, params }
    }

    /// Runs every stage in order.
    pub async fn run(&self, source: &SourceTable) -> ExportResult<ExportReport> {
        self.params.validate()?;
        let source_columns = source.columns()?;

        let site_id = self.resolve_site().await?;
        let (list, list_created) = self.resolve_or_create_list(&site_id, &source_columns).await?;
        let (columns, pruned_columns) = self.reconcile_schema(&site_id, &list, &source_columns).await?;
        let deleted_items = self.empty_list(&site_id, &list.id).await?;
        let written_rows = self.write_rows(&site_id, &list.id, source, &pruned_columns).await?;

        info!(
            "{}: {} rows written to list {} ({} items removed)",
            ExportStage::Done,
            written_rows,
            self.params.list_name,
            deleted_items
        );
        Ok(ExportReport {
            site_id,
            list,
            list_created,
            columns,
            pruned_columns,
            deleted_items,
            written_rows,
        })
    }

    pub async fn resolve_site(&self) -> ExportResult<String> {
        let site = self
            .client
            .get_site_by_relative_url(&self.params.base_host_name, &self.params.site_url_rel_path)
            .await?;
        match site.id {
            Some(id) => {
                debug!("Resolved site {} to {}", self.params.site_url(), id);
                Ok(id)
            }
            None => Err(ExportError::SiteNotFound(self.params.site_url())),
        }
    }

    /// Returns the list and whether it was created by this call.
    pub async fn resolve_or_create_list(
        &self,
        site_id: &str,
        source_columns: &[String],
    ) -> ExportResult<(ListHandle, bool)> {
        let name = &self.params.list_name;
        let existing = self.client.get_site_list_by_name(site_id, name).await?;

        match (existing, self.params.new_list()) {
            (Some(list), Some(_)) => {
                warn!(
                    "List \"{}\" already exists, the create_new configuration will be ignored",
                    name
                );
                Ok((list, false))
            }
            (Some(list), None) => Ok((list, false)),
            (None, Some(config)) => {
                let definition =
                    build_list_definition(name, self.params.description(), config, source_columns)?;
                info!("Creating list \"{}\" with {} columns", name, definition.columns.len());
                let list = self.client.create_list(site_id, &definition).await?;
                Ok((list, true))
            }
            (None, None) => Err(ExportError::ListNotFound {
                list: name.clone(),
                site: self.params.site_url(),
            }),
        }
    }

    /// Checks the source columns against the list's actual columns and
    /// returns the deduplicated columns plus the source columns to drop.
    pub async fn reconcile_schema(
        &self,
        site_id: &str,
        list: &ListHandle,
        source_columns: &[String],
    ) -> ExportResult<(Vec<ListColumn>, Vec<String>)> {
        let mut columns = self.client.get_site_list_columns(site_id, &list.id, false).await?;
        dedupe_display_names(&mut columns);

        let pruned = reconcile_with_list(source_columns, &columns, self.params.title_source())?;
        if !pruned.is_empty() {
            warn!(
                "Columns {:?} do not exist in the destination list and will be ignored",
                pruned
            );
        }
        Ok((columns, pruned))
    }

    /// Deletes every item of the list, page by page. Returns the number of
    /// deleted items.
    pub async fn empty_list(&self, site_id: &str, list_id: &str) -> ExportResult<usize> {
        info!("Removing all existing items..");
        let mut deleted = 0;
        let mut failures = Vec::new();

        let mut pages = self.client.list_item_pages(site_id, list_id);
        while let Some(items) = pages.try_next().await? {
            let ids: Vec<String> = items.into_iter().map(|item| item.id).collect();
            for chunk in ids.chunks(MAX_BATCH_SIZE) {
                let ops: Vec<BatchOperation> = chunk
                    .iter()
                    .enumerate()
                    .map(|(i, id)| BatchOperation::delete_item(i.to_string(), site_id, list_id, id))
                    .collect();

                let failed = self.client.submit_batch(&ops, "Delete items").await?;
                let remaining = if failed.is_empty() {
                    failed
                } else {
                    debug!("Retrying {} failed deletes individually", failed.len());
                    recover_failed_deletes(self.client, site_id, list_id, failed, chunk).await
                };

                deleted += chunk.len().saturating_sub(remaining.len());
                failures.extend(remaining.into_iter().map(|f| with_item_id(f, chunk)));
            }
        }

        if !failures.is_empty() {
            return Err(ExportError::PartialBatchFailure {
                stage: ExportStage::EmptyList,
                failures,
            });
        }
        debug!("Removed {} items", deleted);
        Ok(deleted)
    }

    /// Creates one item per source row. Every row is attempted before
    /// failures are reported. Returns the number of created items.
    ///
    /// An unreadable record stops the stage, but rows queued before it are
    /// still submitted.
    pub async fn write_rows(
        &self,
        site_id: &str,
        list_id: &str,
        source: &SourceTable,
        pruned_columns: &[String],
    ) -> ExportResult<usize> {
        info!("Writing rows into list {}", self.params.list_name);
        let title_source = self.params.title_source();
        let mut written = 0;
        let mut failures = Vec::new();
        let mut ops = Vec::with_capacity(MAX_BATCH_SIZE);

        for (index, row) in source.rows()?.enumerate() {
            let mut row = match row {
                Ok(row) => row,
                Err(e) => {
                    self.submit_creates(&ops, &mut failures).await?;
                    return Err(e);
                }
            };
            if let Some(title) = title_source {
                row.rename(title, TITLE_COLUMN);
            }
            row.remove_columns(pruned_columns);
            ops.push(BatchOperation::create_item(
                index.to_string(),
                site_id,
                list_id,
                row.into_fields(),
            ));

            if ops.len() == MAX_BATCH_SIZE {
                written += self.submit_creates(&ops, &mut failures).await?;
                ops.clear();
            }
        }
        written += self.submit_creates(&ops, &mut failures).await?;

        if !failures.is_empty() {
            return Err(ExportError::PartialBatchFailure {
                stage: ExportStage::WriteRows,
                failures,
            });
        }
        Ok(written)
    }

    async fn submit_creates(
        &self,
        ops: &[BatchOperation],
        failures: &mut Vec<BatchOutcome>,
    ) -> ExportResult<usize> {
        let failed = self.client.submit_batch(ops, "Create items").await?;
        for f in &failed {
            warn!("Row {} was not written (HTTP {})", f.id, f.status);
        }
        let created = ops.len().saturating_sub(failed.len());
        failures.extend(failed);
        Ok(created)
    }
}

/// Swaps a batch-local correlation id for the item id it refers to.
fn with_item_id(mut outcome: BatchOutcome, item_ids: &[String]) -> BatchOutcome {
    if let Some(id) = outcome.id.parse::<usize>().ok().and_then(|i| item_ids.get(i)) {
        outcome.id = id.clone();
    }
    outcome
}
