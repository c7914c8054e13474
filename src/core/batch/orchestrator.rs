//! Run orchestration: authenticate, batch, submit, aggregate, compensate

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::batcher::partition;
use super::compensation::CompensationPlanner;
use super::correlator::{self, CANCELLED, TRANSPORT_FAILURE};
use super::submitter::BatchSubmitter;
use super::types::{BatchStats, OperationDraft, OperationOutcome, RunPhase, RunReport};
use crate::auth::CredentialProvider;
use crate::utils::error::Result;

/// Shared cooperative-cancellation handle
///
/// Cancellation takes effect at batch granularity during submission and at
/// delete granularity during compensation; in-flight calls run to completion
/// and skipped work is reported explicitly.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a fresh, uncancelled flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Well-defined pause points of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Batches are built, submission is about to start
    BeforeSubmission {
        /// Number of batches about to be submitted
        batches: usize,
        /// Total operations across all batches
        operations: usize,
    },
    /// Outcomes are aggregated, created resources are about to be deleted
    BeforeCompensation {
        /// Number of resources selected for deletion
        resources: usize,
    },
    /// The run has finished
    RunComplete,
}

/// Pause point hook injected into the orchestrator
///
/// Lets an interactive front-end hold the run at each checkpoint without the
/// core knowing anything about terminals. Returning an error aborts the run.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    /// Called at each checkpoint; return `Ok(())` to continue
    async fn confirm(&self, checkpoint: Checkpoint) -> Result<()>;
}

/// Gate that never pauses, for non-interactive runs and tests
pub struct AutoConfirm;

#[async_trait]
impl ConfirmationGate for AutoConfirm {
    async fn confirm(&self, _checkpoint: Checkpoint) -> Result<()> {
        Ok(())
    }
}

/// Drives a bulk run end to end
///
/// Collaborators arrive by injection; the orchestrator owns no ambient state
/// and a single instance can drive many runs.
pub struct BatchOrchestrator {
    credentials: Arc<dyn CredentialProvider>,
    submitter: BatchSubmitter,
    gate: Arc<dyn ConfirmationGate>,
    batch_capacity: usize,
    max_concurrent_batches: usize,
    cancel: CancelFlag,
}

impl BatchOrchestrator {
    /// Create an orchestrator with a no-op gate and sequential submission
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        submitter: BatchSubmitter,
        batch_capacity: usize,
    ) -> Self {
        Self {
            credentials,
            submitter,
            gate: Arc::new(AutoConfirm),
            batch_capacity,
            max_concurrent_batches: 1,
            cancel: CancelFlag::new(),
        }
    }

    /// Install a confirmation gate
    pub fn with_gate(mut self, gate: Arc<dyn ConfirmationGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Allow up to `n` batch submissions in flight at once
    ///
    /// Batches are independent of each other, so concurrent submission is
    /// safe; outcomes are merged back into input order either way.
    pub fn with_max_concurrent_batches(mut self, n: usize) -> Self {
        self.max_concurrent_batches = n.max(1);
        self
    }

    /// Handle for cancelling this orchestrator's runs
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Execute a full run over the given operations
    ///
    /// Passing a collection path as `compensation_target` opts into the
    /// cleanup pass that deletes every resource the run created; compensation
    /// never happens implicitly. Only configuration and authentication
    /// problems abort the run; everything later is captured in the report.
    pub async fn run(
        &self,
        drafts: Vec<OperationDraft>,
        compensation_target: Option<&str>,
    ) -> Result<RunReport> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let total = drafts.len();
        info!(%run_id, operations = total, "starting bulk run");

        let token = self.credentials.access_token().await?;
        info!(%run_id, "authenticated");

        let batches = partition(drafts, self.batch_capacity)?;
        info!(%run_id, batches = batches.len(), "operations batched");

        self.gate
            .confirm(Checkpoint::BeforeSubmission {
                batches: batches.len(),
                operations: total,
            })
            .await?;

        let token_secret = token.secret().to_string();
        let submitter = &self.submitter;
        let cancel = &self.cancel;

        let mut indexed: Vec<(usize, Option<String>, Vec<OperationOutcome>)> =
            stream::iter(batches.iter().enumerate())
                .map(|(index, batch)| {
                    let token = token_secret.clone();
                    async move {
                        if cancel.is_cancelled() {
                            warn!(batch = index, "skipping batch, run cancelled");
                            return (
                                index,
                                Some(CANCELLED.to_string()),
                                correlator::failed_outcomes(batch, CANCELLED),
                            );
                        }

                        match submitter.submit(batch, &token).await {
                            Ok(results) => (index, None, correlator::correlate(batch, &results)),
                            Err(e) => {
                                warn!(batch = index, error = %e, "batch submission failed");
                                (
                                    index,
                                    Some(e.to_string()),
                                    correlator::failed_outcomes(batch, TRANSPORT_FAILURE),
                                )
                            }
                        }
                    }
                })
                .buffer_unordered(self.max_concurrent_batches)
                .collect()
                .await;

        // Merge back into input order regardless of completion order
        indexed.sort_by_key(|(index, _, _)| *index);

        let mut outcomes = Vec::with_capacity(total);
        let mut batch_stats = Vec::with_capacity(indexed.len());
        for (index, transport_error, batch_outcomes) in indexed {
            let succeeded = batch_outcomes.iter().filter(|o| o.succeeded).count();
            batch_stats.push(BatchStats {
                index,
                size: batch_outcomes.len(),
                succeeded,
                failed: batch_outcomes.len() - succeeded,
                transport_error,
            });
            outcomes.extend(batch_outcomes);
        }

        let mut report = RunReport {
            run_id: run_id.clone(),
            phase: RunPhase::Aggregated,
            started_at,
            finished_at: Utc::now(),
            batches: batch_stats,
            outcomes,
            compensation: None,
        };
        info!(
            %run_id,
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            "outcomes aggregated"
        );

        if let Some(collection_path) = compensation_target {
            let plan = CompensationPlanner::plan(&report.outcomes);
            self.gate
                .confirm(Checkpoint::BeforeCompensation {
                    resources: plan.len(),
                })
                .await?;

            report.phase = RunPhase::Compensating;
            let token = self.credentials.access_token().await?;
            let planner = CompensationPlanner::new(self.submitter.clone(), collection_path);
            let compensation = planner.execute(&plan, token.secret(), &self.cancel).await;
            report.compensation = Some(compensation);
        }

        report.phase = RunPhase::Done;
        report.finished_at = Utc::now();
        self.gate.confirm(Checkpoint::RunComplete).await?;

        info!(%run_id, "run finished");
        Ok(report)
    }
}
