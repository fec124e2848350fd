//! Individual retries for deletes that failed inside a batch.

use listsync_graph::{BatchOutcome, GraphClient, GraphError};
use tracing::{debug, warn};

/// Retries each failed delete once, outside of a batch, one after another.
///
/// `item_ids` are the item ids of the batch the failures came from, indexed
/// by correlation id. A retry that succeeds or reports "not found" clears the
/// failure. Any other error is kept with the status and body of the retry.
pub async fn recover_failed_deletes(
    client: &GraphClient,
    site_id: &str,
    list_id: &str,
    failed: Vec<BatchOutcome>,
    item_ids: &[String],
) -> Vec<BatchOutcome> {
    let mut remaining = Vec::new();

    for outcome in failed {
        let Some(item_id) = outcome.id.parse::<usize>().ok().and_then(|i| item_ids.get(i)) else {
            warn!("No item for failed delete with correlation id {}", outcome.id);
            remaining.push(outcome);
            continue;
        };

        match client.delete_list_item(site_id, list_id, item_id).await {
            Ok(()) => debug!("Item {} deleted on retry", item_id),
            Err(e) if e.is_not_found() => debug!("Item {} already gone", item_id),
            Err(e) => {
                warn!("Retrying delete of item {} failed: {}", item_id, e);
                remaining.push(retry_outcome(outcome.id, e));
            }
        }
    }

    remaining
}

fn retry_outcome(id: String, error: GraphError) -> BatchOutcome {
    BatchOutcome {
        id,
        status: error.status().unwrap_or_default(),
        body: Some(serde_json::Value::String(error.to_string())),
    }
}
