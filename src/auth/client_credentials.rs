//! OAuth2 client-credentials flow
//!
//! Exchanges the configured client id/secret for an application token at the
//! tenant's token endpoint and caches the result until shortly before expiry.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{AccessToken, CredentialProvider};
use crate::config::Config;
use crate::utils::error::{GraphBatchError, Result};

/// Refresh the cached token when it is this close to expiry
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// Token endpoint response, RFC 6749 §5.1
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Client-credentials token provider with an in-memory cache
pub struct ClientCredentialsProvider {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    cached: RwLock<Option<AccessToken>>,
}

impl ClientCredentialsProvider {
    /// Build a provider from the run configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            token_url: config.token_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
            cached: RwLock::new(None),
        })
    }

    /// Build a provider against an explicit token endpoint
    ///
    /// Lets tests point the flow at a mock authority.
    pub fn with_token_url(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: scope.into(),
            cached: RwLock::new(None),
        })
    }

    async fn request_token(&self) -> Result<AccessToken> {
        debug!("Requesting client-credentials token from {}", self.token_url);

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| GraphBatchError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphBatchError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GraphBatchError::Auth(format!("malformed token response: {}", e)))?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in);
        info!("Acquired access token, expires at {}", expires_at);
        Ok(AccessToken::new(token.access_token, expires_at))
    }
}

#[async_trait]
impl CredentialProvider for ClientCredentialsProvider {
    async fn access_token(&self) -> Result<AccessToken> {
        let leeway = Duration::seconds(EXPIRY_LEEWAY_SECS);

        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.expires_within(leeway) {
                    return Ok(token.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if !token.expires_within(leeway) {
                return Ok(token.clone());
            }
        }

        let fresh = self.request_token().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}
