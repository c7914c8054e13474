//! graph-batch - bulk calendar-event batching driver
//!
//! Creates sample events against a Graph mailbox in `$batch` envelopes and
//! can remove them again in a compensation pass.

use async_trait::async_trait;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use graph_batch_rs::auth::ClientCredentialsProvider;
use graph_batch_rs::config::Config;
use graph_batch_rs::core::batch::{
    AutoConfirm, BatchOrchestrator, BatchSubmitter, Checkpoint, ConfirmationGate, RunReport,
};
use graph_batch_rs::core::calendar;
use graph_batch_rs::utils::error::{GraphBatchError, Result};

/// Bulk calendar-event batching driver
#[derive(Debug, Parser)]
#[command(name = "graph-batch", version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config/batch.yaml")]
    config: PathBuf,

    /// Number of sample events to create
    #[arg(long, default_value_t = 60)]
    count: usize,

    /// Delete every created event after the run
    #[arg(long)]
    compensate: bool,

    /// Skip the interactive confirmation checkpoints
    #[arg(long, short = 'y')]
    yes: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging system
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();
    match run(args).await {
        Ok(report) => {
            print_summary(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<RunReport> {
    let config = if args.config.exists() {
        Config::from_file(&args.config).await?
    } else {
        info!(
            "Config file {:?} not found, falling back to environment variables",
            args.config
        );
        Config::from_env()?
    };

    let credentials = Arc::new(ClientCredentialsProvider::new(&config)?);
    let submitter = BatchSubmitter::new(
        &config.base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let gate: Arc<dyn ConfirmationGate> = if args.yes {
        Arc::new(AutoConfirm)
    } else {
        Arc::new(StdinGate)
    };

    let orchestrator = BatchOrchestrator::new(credentials, submitter, config.batch_capacity)
        .with_max_concurrent_batches(config.max_concurrent_batches)
        .with_gate(gate);

    info!("Generating {} sample events", args.count);
    let events = calendar::sample_events(args.count);
    let drafts = calendar::event_drafts(&config.calendar_email, &events)?;

    let collection_path = calendar::events_collection_path(&config.calendar_email);
    let compensation_target = args.compensate.then_some(collection_path.as_str());

    orchestrator.run(drafts, compensation_target).await
}

/// Gate that pauses for an enter keypress at every checkpoint
struct StdinGate;

#[async_trait]
impl ConfirmationGate for StdinGate {
    async fn confirm(&self, checkpoint: Checkpoint) -> Result<()> {
        match checkpoint {
            Checkpoint::BeforeSubmission {
                batches,
                operations,
            } => {
                println!(
                    "{} operations in {} batches. Press enter to submit them.",
                    operations, batches
                );
            }
            Checkpoint::BeforeCompensation { resources } => {
                println!(
                    "{} events created. Press enter to remove them from the calendar.",
                    resources
                );
            }
            Checkpoint::RunComplete => {
                println!("Run complete. Press enter to exit.");
            }
        }

        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| ())
        })
        .await
        .map_err(|e| GraphBatchError::Io(std::io::Error::other(e)))??;

        Ok(())
    }
}

fn print_summary(report: &RunReport) {
    println!("Run {} finished ({:?})", report.run_id, report.phase);
    println!(
        "  operations: {} total, {} succeeded, {} failed",
        report.total_operations(),
        report.succeeded_count(),
        report.failed_count()
    );
    for batch in &report.batches {
        match &batch.transport_error {
            Some(error) => println!(
                "  batch {}: all {} operations lost ({})",
                batch.index, batch.size, error
            ),
            None => println!(
                "  batch {}: {} succeeded, {} failed",
                batch.index, batch.succeeded, batch.failed
            ),
        }
    }
    if let Some(compensation) = &report.compensation {
        println!(
            "  compensation: {} planned, {} deleted, {} failed",
            compensation.planned, compensation.succeeded, compensation.failed
        );
    }
}
