//! JSON batching (`$batch`): many item operations in one round trip.

use crate::client::GraphClient;
use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Maximum number of sub-requests Graph accepts in one batch.
pub const MAX_BATCH_SIZE: usize = 20;

/// Verb of a batched item operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchVerb {
    #[serde(rename = "POST")]
    Create,
    #[serde(rename = "DELETE")]
    Delete,
}

/// One sub-request of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOperation {
    /// Correlation id, unique within the batch.
    pub id: String,
    pub url: String,
    pub method: BatchVerb,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

impl BatchOperation {
    /// Creates a list item from a field map.
    pub fn create_item(
        id: impl Into<String>,
        site_id: &str,
        list_id: &str,
        fields: Map<String, Value>,
    ) -> Self {
        let headers = BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]);
        Self {
            id: id.into(),
            url: format!("/sites/{site_id}/lists/{list_id}/items"),
            method: BatchVerb::Create,
            body: Some(json!({ "fields": fields })),
            headers: Some(headers),
        }
    }

    /// Deletes a list item.
    pub fn delete_item(id: impl Into<String>, site_id: &str, list_id: &str, item_id: &str) -> Self {
        Self {
            id: id.into(),
            url: format!("/sites/{site_id}/lists/{list_id}/items/{item_id}"),
            method: BatchVerb::Delete,
            body: None,
            headers: None,
        }
    }
}

/// Outcome of one sub-request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub id: String,
    pub status: u16,
    #[serde(default)]
    pub body: Option<Value>,
}

impl BatchOutcome {
    pub fn is_failed(&self) -> bool {
        self.status >= 300
    }
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    responses: Vec<BatchOutcome>,
}

impl GraphClient {
    /// Submits up to [`MAX_BATCH_SIZE`] operations as one request and returns
    /// the failed sub-requests only.
    ///
    /// Chunking longer sequences is the caller's job. A rejected batch as a
    /// whole surfaces as the transport error. An empty slice returns
    /// immediately without a request.
    ///
    /// Outcomes are de-duplicated by correlation id. An id that was not
    /// submitted makes the response [`GraphError::UnexpectedResponse`].
    pub async fn submit_batch(
        &self,
        operations: &[BatchOperation],
        description: &str,
    ) -> GraphResult<Vec<BatchOutcome>> {
        if operations.len() > MAX_BATCH_SIZE {
            return Err(GraphError::BatchTooLarge {
                size: operations.len(),
                limit: MAX_BATCH_SIZE,
            });
        }
        if operations.is_empty() {
            return Ok(Vec::new());
        }

        debug!("{}: submitting batch of {} operations", description, operations.len());

        let body = json!({ "requests": operations });
        let response = self
            .post("$batch", &body)
            .await?
            .ok_or_else(|| GraphError::UnexpectedResponse("empty batch response".to_string()))?;
        let parsed: BatchResponse = serde_json::from_value(response)?;

        let submitted: HashSet<&str> = operations.iter().map(|op| op.id.as_str()).collect();
        let mut seen = HashSet::new();
        let mut failed = Vec::new();
        for outcome in parsed.responses {
            if !submitted.contains(outcome.id.as_str()) {
                return Err(GraphError::UnexpectedResponse(format!(
                    "batch response for unknown request id \"{}\"",
                    outcome.id
                )));
            }
            if seen.insert(outcome.id.clone()) && outcome.is_failed() {
                failed.push(outcome);
            }
        }
        if !failed.is_empty() {
            debug!("{}: {} of {} operations failed", description, failed.len(), operations.len());
        }
        Ok(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_operation_wire_format() {
        let mut fields = Map::new();
        fields.insert("Title".into(), Value::String("a".into()));
        let op = BatchOperation::create_item("7", "site", "list", fields);
        let v = serde_json::to_value(&op).unwrap();
        assert_eq!(v["id"], "7");
        assert_eq!(v["method"], "POST");
        assert_eq!(v["url"], "/sites/site/lists/list/items");
        assert_eq!(v["body"]["fields"]["Title"], "a");
        assert_eq!(v["headers"]["Content-Type"], "application/json");
    }

    #[test]
    fn delete_operation_has_no_body() {
        let op = BatchOperation::delete_item("0", "site", "list", "42");
        let v = serde_json::to_value(&op).unwrap();
        assert_eq!(v["method"], "DELETE");
        assert_eq!(v["url"], "/sites/site/lists/list/items/42");
        assert!(v.get("body").is_none());
        assert!(v.get("headers").is_none());
    }

    #[test]
    fn outcome_failure_threshold() {
        let ok = BatchOutcome { id: "1".into(), status: 204, body: None };
        let redirect = BatchOutcome { id: "2".into(), status: 300, body: None };
        assert!(!ok.is_failed());
        assert!(redirect.is_failed());
    }
}
