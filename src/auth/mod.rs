//! Authentication against the Microsoft identity platform
//!
//! The engine never inspects credentials itself; it asks a [`CredentialProvider`]
//! for a bearer token and forwards it. The default provider implements the
//! OAuth2 client-credentials grant with an in-memory cache.

pub mod client_credentials;

pub use client_credentials::ClientCredentialsProvider;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::utils::error::Result;

/// A bearer token together with its expiry
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token with an absolute expiry
    pub fn new(secret: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    /// The raw bearer token value
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Expiry instant reported by the authority
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token expires within the given leeway from now
    pub fn expires_within(&self, leeway: Duration) -> bool {
        Utc::now() + leeway >= self.expires_at
    }
}

/// Source of bearer tokens for the target API
///
/// Implementations must be safe to share across concurrent batch submissions.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Return a token valid for at least the next request
    async fn access_token(&self) -> Result<AccessToken>;
}

/// Credential provider returning a fixed, pre-acquired token
///
/// Useful in tests and for callers that manage token acquisition themselves.
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    /// Wrap an already-acquired token
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(secret, Utc::now() + Duration::hours(1)),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<AccessToken> {
        Ok(self.token.clone())
    }
}
