//! Partitioning of operations into provider-sized batches

use tracing::debug;

use super::types::{Batch, OperationDraft, OperationRecord};
use crate::utils::error::{GraphBatchError, Result};

/// Partition an ordered sequence of drafts into fixed-capacity batches
///
/// A batch is sealed strictly after `capacity` operations; the final partial
/// batch is emitted as-is. Empty input produces zero batches, never one empty
/// batch. Each step receives a correlation id that is its monotonic index
/// within the batch, rendered as a decimal string; uniqueness is scoped to
/// the batch because correlation only has to resolve within one envelope.
///
/// Pure data transformation, no I/O.
pub fn partition(drafts: Vec<OperationDraft>, capacity: usize) -> Result<Vec<Batch>> {
    if capacity == 0 {
        return Err(GraphBatchError::Config(
            "batch capacity must be positive".to_string(),
        ));
    }

    let total = drafts.len();
    let mut batches = Vec::with_capacity(total.div_ceil(capacity));
    let mut current: Vec<OperationRecord> = Vec::with_capacity(capacity.min(total));

    for draft in drafts {
        let correlation_id = current.len().to_string();
        current.push(OperationRecord {
            correlation_id,
            method: draft.method,
            target_path: draft.target_path,
            payload: draft.payload,
        });

        if current.len() == capacity {
            batches.push(Batch {
                steps: std::mem::take(&mut current),
                capacity,
            });
            current.reserve(capacity);
        }
    }

    if !current.is_empty() {
        batches.push(Batch {
            steps: current,
            capacity,
        });
    }

    debug!(
        operations = total,
        capacity,
        batches = batches.len(),
        "partitioned operations"
    );
    Ok(batches)
}
