//! Error handling for the batch engine
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for the batch engine
pub type Result<T> = std::result::Result<T, GraphBatchError>;

/// Main error type for the batch engine
///
/// Only `Config` and `Auth` abort a run. Transport errors are scoped to one
/// batch submission and are converted into per-operation outcomes by the
/// orchestrator; individual sub-request and compensation failures never
/// surface here at all, they are recorded in the run report.
#[derive(Error, Debug)]
pub enum GraphBatchError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential provider failures
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Envelope-level failure for a single batch submission
    #[error("Batch transport error: {0}")]
    Transport(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Run aborted at a confirmation checkpoint or via the cancel flag
    #[error("Run cancelled")]
    Cancelled,
}

impl GraphBatchError {
    /// Whether the error aborts the whole run rather than a single batch
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Auth(_) | Self::Cancelled)
    }
}
