//! Correlation of unordered sub-responses back to their operations

use super::envelope::BatchResultSet;
use super::types::{Batch, OperationOutcome};

/// Failure reason when the provider dropped a sub-response
pub const NO_RESPONSE: &str = "no response received";

/// Failure reason applied to every step of a transport-failed batch
pub const TRANSPORT_FAILURE: &str = "batch transport failure";

/// Failure reason for steps skipped after cancellation
pub const CANCELLED: &str = "run cancelled";

/// Map each sub-response back to its originating step
///
/// Outcomes come back in the original request order regardless of the order
/// the provider listed its responses in; lookup goes through the correlation
/// id, never through positional index. A step whose id is absent from the
/// result set becomes a failed outcome, not an error.
pub fn correlate(batch: &Batch, results: &BatchResultSet) -> Vec<OperationOutcome> {
    batch
        .steps
        .iter()
        .map(|step| match results.get(&step.correlation_id) {
            Some(response) if response.is_success() => {
                // Not every operation returns a created-resource id; deletes
                // reply 204 with no body at all.
                let result_id = response
                    .body
                    .as_ref()
                    .and_then(|body| body.get("id"))
                    .and_then(|id| id.as_str())
                    .map(str::to_owned);
                OperationOutcome::success(step.correlation_id.as_str(), response.status, result_id)
            }
            Some(response) => {
                let detail = response
                    .body
                    .as_ref()
                    .and_then(|body| body.pointer("/error/message"))
                    .and_then(|message| message.as_str())
                    .unwrap_or_else(|| response.reason_phrase());
                OperationOutcome::failure(step.correlation_id.as_str(), response.status, detail)
            }
            None => OperationOutcome::failure(step.correlation_id.as_str(), 0, NO_RESPONSE),
        })
        .collect()
}

/// Failed outcomes for every step of a batch, with a shared reason
///
/// Used when the whole envelope was lost to a transport error or skipped by
/// cancellation.
pub fn failed_outcomes(batch: &Batch, reason: &str) -> Vec<OperationOutcome> {
    batch
        .steps
        .iter()
        .map(|step| OperationOutcome::failure(step.correlation_id.as_str(), 0, reason))
        .collect()
}
