//! Provider wire format for multi-request batching
//!
//! A batch is POSTed to `{base_url}/$batch` as a JSON object with a
//! `requests` array; the reply carries a `responses` array whose entries may
//! arrive in any order relative to the requests.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::types::{Batch, HttpMethod, OperationRecord};

/// Hard provider limit on requests per envelope
pub const PROVIDER_MAX_BATCH: usize = 20;

/// Path of the batching endpoint under the API version root
pub const BATCH_ENDPOINT: &str = "$batch";

/// One entry of the envelope's `requests` array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubRequest {
    /// Correlation id tying this request to its response entry
    pub id: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API version root
    pub url: String,
    /// Request body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Per-request headers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl SubRequest {
    /// Build the wire form of one batch step
    ///
    /// The provider requires an explicit Content-Type on sub-requests that
    /// carry a body.
    pub fn from_record(record: &OperationRecord) -> Self {
        let headers = record.payload.as_ref().map(|_| {
            HashMap::from([("Content-Type".to_string(), "application/json".to_string())])
        });

        Self {
            id: record.correlation_id.clone(),
            method: record.method,
            url: record.target_path.clone(),
            body: record.payload.clone(),
            headers,
        }
    }
}

/// Request envelope: `{"requests": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequestEnvelope {
    /// Sub-requests in submission order
    pub requests: Vec<SubRequest>,
}

impl BatchRequestEnvelope {
    /// Serialize a batch into its wire form
    pub fn from_batch(batch: &Batch) -> Self {
        Self {
            requests: batch.steps.iter().map(SubRequest::from_record).collect(),
        }
    }
}

/// One entry of the envelope's `responses` array
///
/// Keyed by correlation id, never by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubResponse {
    /// Correlation id of the originating sub-request
    pub id: String,
    /// Sub-request status code
    pub status: u16,
    /// Response body, absent on bodyless replies such as 204
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Response headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl SubResponse {
    /// Whether the sub-request landed in the HTTP success range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Canonical reason phrase for the status code
    pub fn reason_phrase(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status")
    }
}

/// Response envelope: `{"responses": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponseEnvelope {
    /// Sub-responses in provider order, which may differ from request order
    pub responses: Vec<SubResponse>,
}

/// Sub-responses of one envelope, keyed by correlation id
pub type BatchResultSet = HashMap<String, SubResponse>;

impl BatchResponseEnvelope {
    /// Index the responses by correlation id, discarding arrival order
    pub fn into_result_set(self) -> BatchResultSet {
        self.responses
            .into_iter()
            .map(|response| (response.id.clone(), response))
            .collect()
    }
}
