//! Batch submission integration tests
//!
//! Exercise the envelope wire format, bearer authentication, and the
//! transport-failure contract against a fake Graph endpoint.

use std::time::Duration;

use graph_batch_rs::core::batch::{BatchSubmitter, correlator, partition};
use graph_batch_rs::utils::error::GraphBatchError;
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::fixtures::{TEST_TOKEN, create_drafts};
use crate::common::mock_graph::BatchResponder;

fn submitter_for(server: &MockServer) -> BatchSubmitter {
    BatchSubmitter::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

// ==================== Envelope submission ====================

#[tokio::test]
async fn test_submit_sends_bearer_and_correlates_all_steps() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .and(bearer_token(TEST_TOKEN))
        .respond_with(BatchResponder::success())
        .expect(1)
        .mount(&server)
        .await;

    let batches = partition(create_drafts(3), 20).unwrap();
    let submitter = submitter_for(&server);

    let results = submitter.submit(&batches[0], TEST_TOKEN).await.unwrap();
    assert_eq!(results.len(), 3);

    let outcomes = correlator::correlate(&batches[0], &results);
    assert!(outcomes.iter().all(|o| o.succeeded));
    assert!(outcomes.iter().all(|o| o.result_id.is_some()));
}

#[tokio::test]
async fn test_shuffled_responses_do_not_change_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::shuffled())
        .mount(&server)
        .await;

    let batches = partition(create_drafts(5), 20).unwrap();
    let submitter = submitter_for(&server);

    let results = submitter.submit(&batches[0], TEST_TOKEN).await.unwrap();
    let outcomes = correlator::correlate(&batches[0], &results);

    // Outcomes follow request order even though the provider reversed its list
    let ids: Vec<&str> = outcomes.iter().map(|o| o.correlation_id.as_str()).collect();
    assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    assert!(outcomes.iter().all(|o| o.succeeded));
}

#[tokio::test]
async fn test_one_failing_step_leaves_siblings_successful() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::failing("1", 429))
        .mount(&server)
        .await;

    let batches = partition(create_drafts(3), 20).unwrap();
    let submitter = submitter_for(&server);

    let results = submitter.submit(&batches[0], TEST_TOKEN).await.unwrap();
    let outcomes = correlator::correlate(&batches[0], &results);

    assert!(outcomes[0].succeeded);
    assert!(!outcomes[1].succeeded);
    assert_eq!(outcomes[1].status, 429);
    assert_eq!(outcomes[1].error.as_deref(), Some("simulated failure"));
    assert!(outcomes[2].succeeded);
}

#[tokio::test]
async fn test_dropped_response_yields_no_response_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::dropping("1"))
        .mount(&server)
        .await;

    let batches = partition(create_drafts(3), 20).unwrap();
    let submitter = submitter_for(&server);

    let results = submitter.submit(&batches[0], TEST_TOKEN).await.unwrap();
    let outcomes = correlator::correlate(&batches[0], &results);

    assert!(outcomes[0].succeeded);
    assert_eq!(outcomes[1].error.as_deref(), Some(correlator::NO_RESPONSE));
    assert!(outcomes[2].succeeded);
}

// ==================== Transport failures ====================

#[tokio::test]
async fn test_rejected_envelope_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let batches = partition(create_drafts(2), 20).unwrap();
    let submitter = submitter_for(&server);

    let err = submitter.submit(&batches[0], TEST_TOKEN).await.unwrap_err();
    assert!(matches!(err, GraphBatchError::Transport(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_transport_error() {
    // Nothing listens on this port
    let submitter = BatchSubmitter::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    let batches = partition(create_drafts(1), 20).unwrap();

    let err = submitter.submit(&batches[0], TEST_TOKEN).await.unwrap_err();
    assert!(matches!(err, GraphBatchError::Transport(_)));
}

#[tokio::test]
async fn test_malformed_envelope_body_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let batches = partition(create_drafts(1), 20).unwrap();
    let submitter = submitter_for(&server);

    let err = submitter.submit(&batches[0], TEST_TOKEN).await.unwrap_err();
    assert!(matches!(err, GraphBatchError::Transport(_)));
}
