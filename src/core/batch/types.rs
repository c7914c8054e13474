//! Batch processing types and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP method of a sub-request, serialized uppercase on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A logical write operation before batch assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDraft {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API version root, e.g. `/users/a@b.com/events`
    pub target_path: String,
    /// Request body, absent for bodyless operations
    pub payload: Option<Value>,
}

impl OperationDraft {
    /// Draft a POST carrying a JSON payload
    pub fn post(target_path: impl Into<String>, payload: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            target_path: target_path.into(),
            payload: Some(payload),
        }
    }

    /// Draft a bodyless DELETE
    pub fn delete(target_path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            target_path: target_path.into(),
            payload: None,
        }
    }
}

/// One step of a sealed batch
///
/// Immutable after creation. The correlation id is assigned by the batcher
/// and is unique within the owning batch only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Batch-scoped correlation id
    pub correlation_id: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API version root
    pub target_path: String,
    /// Request body, absent for bodyless operations
    pub payload: Option<Value>,
}

/// A bounded group of operations submitted to the provider in one call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Steps in submission order
    pub steps: Vec<OperationRecord>,
    /// Capacity the batch was built with, `steps.len() <= capacity`
    pub capacity: usize,
}

impl Batch {
    /// Number of steps in the batch
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the batch has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Result of one operation after correlation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// Correlation id of the originating step
    pub correlation_id: String,
    /// Whether the sub-request succeeded
    pub succeeded: bool,
    /// Created resource id, when the provider returned one
    pub result_id: Option<String>,
    /// Sub-response status code, 0 when no response was received
    pub status: u16,
    /// Failure detail, absent on success
    pub error: Option<String>,
}

impl OperationOutcome {
    /// Successful outcome with an optional created-resource id
    pub fn success(correlation_id: impl Into<String>, status: u16, result_id: Option<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            succeeded: true,
            result_id,
            status,
            error: None,
        }
    }

    /// Failed outcome with a diagnostic reason
    pub fn failure(correlation_id: impl Into<String>, status: u16, error: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            succeeded: false,
            result_id: None,
            status,
            error: Some(error.into()),
        }
    }
}

/// Per-batch submission statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStats {
    /// Position of the batch in the partitioned sequence
    pub index: usize,
    /// Number of steps submitted
    pub size: usize,
    /// Steps with a successful outcome
    pub succeeded: usize,
    /// Steps with a failed outcome
    pub failed: usize,
    /// Envelope-level failure, when the whole batch was lost
    pub transport_error: Option<String>,
}

/// Phases of a bulk run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Nothing has happened yet
    Idle,
    /// Access token acquired
    Authenticated,
    /// Operations partitioned into batches
    Batched,
    /// Batch submissions in flight
    Submitting,
    /// All outcomes collected
    Aggregated,
    /// Compensation deletes in flight
    Compensating,
    /// Run finished
    Done,
}

/// Failure entry of a compensation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationFailure {
    /// Resource the delete targeted
    pub resource_id: String,
    /// Failure detail
    pub error: String,
}

/// Report of a best-effort compensation pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompensationReport {
    /// Resources selected for deletion
    pub planned: usize,
    /// Deletes that succeeded
    pub succeeded: usize,
    /// Deletes that failed or were skipped by cancellation
    pub failed: usize,
    /// One entry per failed delete
    pub failures: Vec<CompensationFailure>,
}

/// Aggregate report of a bulk run
///
/// Outcomes are kept in input order across batches; their count always equals
/// the number of submitted operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id of this run
    pub run_id: String,
    /// Last phase the run reached
    pub phase: RunPhase,
    /// Run start time
    pub started_at: DateTime<Utc>,
    /// Run end time
    pub finished_at: DateTime<Utc>,
    /// Per-batch statistics in batch order
    pub batches: Vec<BatchStats>,
    /// Per-operation outcomes in input order
    pub outcomes: Vec<OperationOutcome>,
    /// Compensation report, present only when compensation ran
    pub compensation: Option<CompensationReport>,
}

impl RunReport {
    /// Total operations submitted
    pub fn total_operations(&self) -> usize {
        self.outcomes.len()
    }

    /// Operations that succeeded
    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    /// Operations that failed
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }

    /// Ids of resources created by successful operations
    pub fn created_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.succeeded)
            .filter_map(|o| o.result_id.as_deref())
            .collect()
    }
}
