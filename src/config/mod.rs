//! Configuration management for the batch engine
//!
//! This module handles loading, validation, and management of run configuration.
//! Configuration comes from a YAML file, with environment variables taking
//! precedence so secrets can stay out of the file.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{debug, info};

use crate::core::batch::envelope::PROVIDER_MAX_BATCH;
use crate::utils::error::{GraphBatchError, Result};

/// Default Microsoft identity platform authority
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/";

/// Default Graph API scope for client-credentials tokens
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Default Graph API version root
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Main configuration struct for the batch engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application (client) id registered with the authority
    pub client_id: String,
    /// Client secret for the client-credentials grant
    pub client_secret: String,
    /// Directory (tenant) id
    pub tenant_id: String,
    /// Authority base URL, tenant id is appended to it
    pub authority: String,
    /// OAuth2 scope requested for the access token
    pub scope: String,
    /// Mailbox whose calendar receives the events
    pub calendar_email: String,
    /// API version root all operation paths are relative to
    pub base_url: String,
    /// Maximum operations per batch envelope
    pub batch_capacity: usize,
    /// Upper bound on concurrently in-flight batch submissions
    pub max_concurrent_batches: usize,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            tenant_id: String::new(),
            authority: DEFAULT_AUTHORITY.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            calendar_email: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_capacity: PROVIDER_MAX_BATCH,
            max_concurrent_batches: 1,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GraphBatchError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| GraphBatchError::Config(format!("Failed to parse config: {}", e)))?;

        config.apply_env_overrides()?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GRAPH_*` environment variables on top of the current values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(client_id) = env::var("GRAPH_CLIENT_ID") {
            self.client_id = client_id;
        }
        if let Ok(client_secret) = env::var("GRAPH_CLIENT_SECRET") {
            self.client_secret = client_secret;
        }
        if let Ok(tenant_id) = env::var("GRAPH_TENANT_ID") {
            self.tenant_id = tenant_id;
        }
        if let Ok(authority) = env::var("GRAPH_AUTHORITY") {
            self.authority = authority;
        }
        if let Ok(scope) = env::var("GRAPH_SCOPE") {
            self.scope = scope;
        }
        if let Ok(email) = env::var("GRAPH_CALENDAR_EMAIL") {
            self.calendar_email = email;
        }
        if let Ok(base_url) = env::var("GRAPH_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(capacity) = env::var("GRAPH_BATCH_CAPACITY") {
            self.batch_capacity = capacity
                .parse()
                .map_err(|e| GraphBatchError::Config(format!("Invalid batch capacity: {}", e)))?;
        }
        if let Ok(concurrency) = env::var("GRAPH_MAX_CONCURRENT_BATCHES") {
            self.max_concurrent_batches = concurrency.parse().map_err(|e| {
                GraphBatchError::Config(format!("Invalid max concurrent batches: {}", e))
            })?;
        }
        if let Ok(timeout) = env::var("GRAPH_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = timeout
                .parse()
                .map_err(|e| GraphBatchError::Config(format!("Invalid request timeout: {}", e)))?;
        }
        Ok(())
    }

    /// Validate required fields and provider limits
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(GraphBatchError::Config("client_id is required".to_string()));
        }
        if self.client_secret.is_empty() {
            return Err(GraphBatchError::Config(
                "client_secret is required".to_string(),
            ));
        }
        if self.tenant_id.is_empty() {
            return Err(GraphBatchError::Config("tenant_id is required".to_string()));
        }
        if self.calendar_email.is_empty() {
            return Err(GraphBatchError::Config(
                "calendar_email is required".to_string(),
            ));
        }
        if self.batch_capacity == 0 {
            return Err(GraphBatchError::Config(
                "batch_capacity must be positive".to_string(),
            ));
        }
        if self.batch_capacity > PROVIDER_MAX_BATCH {
            return Err(GraphBatchError::Config(format!(
                "batch_capacity {} exceeds the provider limit of {}",
                self.batch_capacity, PROVIDER_MAX_BATCH
            )));
        }
        if self.max_concurrent_batches == 0 {
            return Err(GraphBatchError::Config(
                "max_concurrent_batches must be positive".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(GraphBatchError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Token endpoint for the configured authority and tenant
    pub fn token_url(&self) -> String {
        let authority = self.authority.trim_end_matches('/');
        format!("{}/{}/oauth2/v2.0/token", authority, self.tenant_id)
    }
}
