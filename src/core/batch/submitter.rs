//! Batch submission over the provider's JSON batching endpoint

use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::envelope::{BATCH_ENDPOINT, BatchRequestEnvelope, BatchResponseEnvelope, BatchResultSet};
use super::types::Batch;
use crate::utils::error::{GraphBatchError, Result};

/// Submits batches as single envelope calls and issues individual requests
/// for the compensation pass
///
/// Holds one shared HTTP client; cheap to clone.
#[derive(Debug, Clone)]
pub struct BatchSubmitter {
    client: reqwest::Client,
    base_url: String,
}

impl BatchSubmitter {
    /// Create a submitter for the given API version root
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Url::parse(base_url)
            .map_err(|e| GraphBatchError::Config(format!("invalid base URL {}: {}", base_url, e)))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The API version root this submitter targets
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn batch_url(&self) -> String {
        format!("{}/{}", self.base_url, BATCH_ENDPOINT)
    }

    /// Absolute URL for a path relative to the version root
    pub fn resource_url(&self, target_path: &str) -> String {
        format!("{}{}", self.base_url, target_path)
    }

    /// Submit one batch as a single envelope call
    ///
    /// Any connection failure, timeout, or non-2xx envelope status is a
    /// transport error that loses the whole batch; sub-request failures are
    /// not errors here, they come back inside the result set.
    pub async fn submit(&self, batch: &Batch, token: &str) -> Result<BatchResultSet> {
        let envelope = BatchRequestEnvelope::from_batch(batch);
        debug!(steps = batch.len(), "submitting batch envelope");

        let response = self
            .client
            .post(self.batch_url())
            .bearer_auth(token)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| GraphBatchError::Transport(format!("batch request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "batch endpoint rejected envelope");
            return Err(GraphBatchError::Transport(format!(
                "batch endpoint returned {}: {}",
                status, body
            )));
        }

        let envelope: BatchResponseEnvelope = response
            .json()
            .await
            .map_err(|e| GraphBatchError::Transport(format!("invalid batch response: {}", e)))?;

        Ok(envelope.into_result_set())
    }

    /// Issue one non-batched DELETE against a resource path
    pub async fn delete_resource(&self, target_path: &str, token: &str) -> Result<()> {
        let url = self.resource_url(target_path);
        debug!(%url, "deleting resource");

        let response = self
            .client
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GraphBatchError::Transport(format!("delete request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphBatchError::Transport(format!(
                "delete returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}
