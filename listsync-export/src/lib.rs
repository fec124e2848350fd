//! Export of a source table into a SharePoint list.
//!
//! [`ListExporter`] replaces the full contents of a list with the rows of a
//! [`SourceTable`], creating the list first when it does not exist and a
//! creation config is supplied. Failed deletes get one individual retry via
//! [`recover_failed_deletes`]; failed creates are reported, never retried.

mod error;
pub mod exporter;
pub mod output;
pub mod params;
pub mod recovery;
pub mod schema;
pub mod source;

pub use error::{ExportError, ExportResult, SchemaError, SchemaResult};
pub use exporter::{ExportReport, ExportStage, ListExporter};
pub use output::{LIST_METADATA_COLUMNS, LIST_METADATA_TABLE, ListMetadataWriter};
pub use params::{ColumnSetup, ExportParams, NewListConfig, TitleColumn};
pub use recovery::recover_failed_deletes;
pub use schema::{build_list_definition, dedupe_display_names, reconcile, reconcile_with_list};
pub use source::{SourceRow, SourceRows, SourceTable};
