//! # graph-batch-rs
//!
//! Bulk-operation batching engine for Microsoft Graph style JSON batch APIs.
//!
//! Given a large set of logical write operations against a resource
//! collection, the engine partitions them into provider-sized batches,
//! submits each batch as one `$batch` envelope call, correlates the
//! unordered sub-responses back to their operations, and can undo every
//! successful create with a best-effort compensation pass of deletes.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use graph_batch_rs::auth::StaticTokenProvider;
//! use graph_batch_rs::core::batch::{BatchOrchestrator, BatchSubmitter, OperationDraft};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Arc::new(StaticTokenProvider::new("token"));
//!     let submitter =
//!         BatchSubmitter::new("https://graph.microsoft.com/v1.0", Duration::from_secs(30))?;
//!
//!     let drafts = vec![OperationDraft::post(
//!         "/users/room@contoso.com/events",
//!         serde_json::json!({"subject": "standup"}),
//!     )];
//!
//!     let orchestrator = BatchOrchestrator::new(credentials, submitter, 20);
//!     let report = orchestrator
//!         .run(drafts, Some("/users/room@contoso.com/events"))
//!         .await?;
//!
//!     println!("{} succeeded, {} failed", report.succeeded_count(), report.failed_count());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use crate::auth::{
    AccessToken, ClientCredentialsProvider, CredentialProvider, StaticTokenProvider,
};
pub use crate::config::Config;
pub use crate::core::batch::{
    AutoConfirm, Batch, BatchOrchestrator, BatchStats, BatchSubmitter, CancelFlag, Checkpoint,
    CompensationPlanner, CompensationReport, ConfirmationGate, HttpMethod, OperationDraft,
    OperationOutcome, OperationRecord, RunPhase, RunReport, partition,
};
pub use crate::utils::error::{GraphBatchError, Result};
