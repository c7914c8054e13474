//! Best-effort compensation for successful creates

use tracing::{info, warn};

use super::correlator::CANCELLED;
use super::orchestrator::CancelFlag;
use super::submitter::BatchSubmitter;
use super::types::{CompensationFailure, CompensationReport, OperationOutcome};

/// Plans and executes the inverse operation set for a finished creation pass
///
/// Deletes run individually rather than batched; the provider supports
/// delete-by-id at equivalent cost and individual calls keep failure
/// reporting per resource. This is cleanup, not a transaction: a failed
/// delete is recorded and the pass moves on.
pub struct CompensationPlanner {
    submitter: BatchSubmitter,
    collection_path: String,
}

impl CompensationPlanner {
    /// Create a planner targeting one resource collection
    pub fn new(submitter: BatchSubmitter, collection_path: impl Into<String>) -> Self {
        let collection_path = collection_path.into();
        Self {
            submitter,
            collection_path: collection_path.trim_end_matches('/').to_string(),
        }
    }

    /// Select the resources that need an inverse operation
    ///
    /// Exactly the successful outcomes that carry a created-resource id.
    pub fn plan(outcomes: &[OperationOutcome]) -> Vec<String> {
        outcomes
            .iter()
            .filter(|outcome| outcome.succeeded)
            .filter_map(|outcome| outcome.result_id.clone())
            .collect()
    }

    /// Delete every planned resource, recording failures without aborting
    ///
    /// An empty plan completes immediately without touching the network.
    pub async fn execute(
        &self,
        resource_ids: &[String],
        token: &str,
        cancel: &CancelFlag,
    ) -> CompensationReport {
        let mut report = CompensationReport {
            planned: resource_ids.len(),
            ..CompensationReport::default()
        };

        if resource_ids.is_empty() {
            return report;
        }

        info!(resources = resource_ids.len(), "executing compensation deletes");

        for resource_id in resource_ids {
            if cancel.is_cancelled() {
                report.failed += 1;
                report.failures.push(CompensationFailure {
                    resource_id: resource_id.clone(),
                    error: CANCELLED.to_string(),
                });
                continue;
            }

            let target_path = format!("{}/{}", self.collection_path, resource_id);
            match self.submitter.delete_resource(&target_path, token).await {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    warn!(%resource_id, error = %e, "compensation delete failed");
                    report.failed += 1;
                    report.failures.push(CompensationFailure {
                        resource_id: resource_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "compensation pass finished"
        );
        report
    }
}
