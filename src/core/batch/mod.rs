//! Bulk-operation batching pipeline
//!
//! This module partitions logical write operations into provider-sized
//! batches, submits each batch as one JSON-envelope call, correlates the
//! unordered sub-responses back to their operations, and can undo successful
//! creates with a best-effort compensation pass.

pub mod batcher;
pub mod compensation;
pub mod correlator;
pub mod envelope;
pub mod orchestrator;
pub mod submitter;
mod types;


// Re-export all public types
pub use batcher::partition;
pub use compensation::CompensationPlanner;
pub use envelope::{
    BatchRequestEnvelope, BatchResponseEnvelope, BatchResultSet, PROVIDER_MAX_BATCH, SubRequest,
    SubResponse,
};
pub use orchestrator::{
    AutoConfirm, BatchOrchestrator, CancelFlag, Checkpoint, ConfirmationGate,
};
pub use submitter::BatchSubmitter;
pub use types::{
    Batch, BatchStats, CompensationFailure, CompensationReport, HttpMethod, OperationDraft,
    OperationOutcome, OperationRecord, RunPhase, RunReport,
};
