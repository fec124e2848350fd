//! Sites, lists, columns and list items.

use crate::client::GraphClient;
use crate::columns::{ListColumn, ListDefinition, is_system_column};
use crate::error::{GraphError, GraphResult};
use futures::stream::{LocalBoxStream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Characters SharePoint drops from a list's URL name.
const STRIPPED_NAME_CHARS: &[char] = &[
    '-', '~', '"', '#', '%', '&', '*', ':', '<', '>', '?', '/', '\\', '{', '|', '}',
];

/// A SharePoint site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A SharePoint list, resolved by name or freshly created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHandle {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Remaining list metadata (timestamps, eTag, webUrl, ...).
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// A list item with its expanded field values.
#[derive(Debug, Clone, Deserialize)]
pub struct ListItem {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Normalizes a list name the way SharePoint does for URL names.
pub fn normalize_list_name(name: &str) -> String {
    name.chars()
        .filter(|c| !STRIPPED_NAME_CHARS.contains(c))
        .collect()
}

impl ListHandle {
    /// True if this list is the one requested by `name`.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name == name
            || normalize_list_name(&self.name) == normalize_list_name(name)
            || self.display_name.as_deref() == Some(name)
    }
}

fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn values<T: serde::de::DeserializeOwned>(page: &Value, key: &str) -> GraphResult<Vec<T>> {
    match page.get(key) {
        Some(v) => Ok(serde_json::from_value(v.clone())?),
        None => Err(GraphError::UnexpectedResponse(format!(
            "missing \"{key}\" in response"
        ))),
    }
}

impl GraphClient {
    /// Looks a site up by hostname (e.g. `tenant.sharepoint.com`) and relative
    /// path (e.g. `/sites/MyTeamSite`).
    pub async fn get_site_by_relative_url(&self, hostname: &str, site_path: &str) -> GraphResult<Site> {
        let endpoint = format!("/sites/{}:/{}", hostname, encode_path(site_path));
        match self.get(&endpoint, &[]).await? {
            Some(body) => Ok(serde_json::from_value(body)?),
            None => Ok(Site::default()),
        }
    }

    /// Returns all lists of a site.
    pub async fn get_site_lists(&self, site_id: &str) -> GraphResult<Vec<ListHandle>> {
        let endpoint = format!("/sites/{site_id}/lists");
        let mut lists = Vec::new();
        let mut pages = self.pages(&endpoint, &[]);
        while let Some(page) = pages.try_next().await? {
            lists.extend(values::<ListHandle>(&page, "value")?);
        }
        Ok(lists)
    }

    /// Finds a list by name, tolerating characters SharePoint strips from names.
    pub async fn get_site_list_by_name(
        &self,
        site_id: &str,
        list_name: &str,
    ) -> GraphResult<Option<ListHandle>> {
        let lists = self.get_site_lists(site_id).await?;
        Ok(lists.into_iter().find(|l| l.matches_name(list_name)))
    }

    /// Returns the columns of a list, optionally without system columns.
    pub async fn get_site_list_columns(
        &self,
        site_id: &str,
        list_id: &str,
        include_system: bool,
    ) -> GraphResult<Vec<ListColumn>> {
        let endpoint = format!("/sites/{site_id}/lists/{list_id}");
        let mut columns = Vec::new();
        let mut pages = self.pages(&endpoint, &[("expand", "columns")]);
        while let Some(page) = pages.try_next().await? {
            columns.extend(values::<ListColumn>(&page, "columns")?);
        }

        if !include_system {
            columns.retain(|c| !is_system_column(&c.name));
        }
        debug!("List {} has {} columns", list_id, columns.len());
        Ok(columns)
    }

    /// Lazily enumerates list items page by page, with fields expanded.
    pub fn list_item_pages(
        &self,
        site_id: &str,
        list_id: &str,
    ) -> LocalBoxStream<'_, GraphResult<Vec<ListItem>>> {
        let endpoint = format!("/sites/{site_id}/lists/{list_id}/items");
        self.pages(&endpoint, &[("expand", "fields")])
            .and_then(|page| async move { values::<ListItem>(&page, "value") })
            .boxed_local()
    }

    /// Deletes a single list item.
    pub async fn delete_list_item(&self, site_id: &str, list_id: &str, item_id: &str) -> GraphResult<()> {
        self.delete(&format!("/sites/{site_id}/lists/{list_id}/items/{item_id}"))
            .await
    }

    /// Creates a list with the given columns.
    pub async fn create_list(&self, site_id: &str, definition: &ListDefinition) -> GraphResult<ListHandle> {
        let endpoint = format!("/sites/{site_id}/lists");
        let body = serde_json::to_value(definition)?;
        match self.post(&endpoint, &body).await? {
            Some(created) => Ok(serde_json::from_value(created)?),
            None => Err(GraphError::UnexpectedResponse(
                "list creation returned no body".to_string(),
            )),
        }
    }
}
