//! Microsoft Graph transport for listsync.
//!
//! Covers only what a SharePoint list export needs:
//!
//! - **Session**: bearer token from a refresh-token exchange, renewed on 401
//! - **Transport**: retries with exponential backoff for transient statuses,
//!   responses classified into [`ApiErrorKind`]
//! - **Paging**: lazy `@odata.nextLink` streams
//! - **Sites & lists**: site lookup, list lookup/creation, columns, items
//! - **Batching**: `$batch` submission of up to [`MAX_BATCH_SIZE`] item operations

pub mod auth;
pub mod batch;
pub mod client;
pub mod columns;
pub mod config;
mod error;
pub mod sites;

pub use auth::TokenSession;
pub use batch::{BatchOperation, BatchOutcome, BatchVerb, MAX_BATCH_SIZE};
pub use client::{GraphClient, PageStream};
pub use columns::{
    ColumnDefinition, ColumnKind, ColumnType, DateTimeColumn, ListColumn, ListDefinition,
    ListInfo, SYSTEM_LIST_COLUMNS, TITLE_COLUMN, TextColumn, UnsupportedColumnType,
    is_system_column,
};
pub use config::{DEFAULT_SCOPE, GraphConfig, OAuthCredentials};
pub use error::{ApiErrorKind, GraphError, GraphResult};
pub use sites::{ListHandle, ListItem, Site, normalize_list_name};
