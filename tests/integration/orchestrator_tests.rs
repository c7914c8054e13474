//! End-to-end orchestrator tests
//!
//! Full runs against the fake Graph endpoint, covering transport-failure
//! isolation, ordering under concurrency, compensation, and cancellation.

use std::sync::Arc;
use std::time::Duration;

use graph_batch_rs::auth::{ClientCredentialsProvider, StaticTokenProvider};
use graph_batch_rs::core::batch::{
    BatchOrchestrator, BatchSubmitter, RunPhase, correlator,
};
use graph_batch_rs::utils::error::GraphBatchError;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::fixtures::{TEST_TOKEN, create_drafts, events_path};
use crate::common::mock_graph::{BatchResponder, mount_token_endpoint, token_url};

fn orchestrator_for(server: &MockServer, capacity: usize) -> BatchOrchestrator {
    let credentials = Arc::new(StaticTokenProvider::new(TEST_TOKEN));
    let submitter = BatchSubmitter::new(&server.uri(), Duration::from_secs(5)).unwrap();
    BatchOrchestrator::new(credentials, submitter, capacity)
}

// ==================== Submission runs ====================

#[tokio::test]
async fn test_full_run_aggregates_all_outcomes_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::success())
        .expect(3)
        .mount(&server)
        .await;

    let report = orchestrator_for(&server, 20)
        .run(create_drafts(45), None)
        .await
        .unwrap();

    assert_eq!(report.phase, RunPhase::Done);
    assert_eq!(report.total_operations(), 45);
    assert_eq!(report.succeeded_count(), 45);
    assert_eq!(report.batches.len(), 3);
    assert_eq!(report.batches[0].size, 20);
    assert_eq!(report.batches[2].size, 5);
    // Batches come back in input order
    let indexes: Vec<usize> = report.batches.iter().map(|b| b.index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
    assert!(report.compensation.is_none());
}

#[tokio::test]
async fn test_transport_failed_batch_does_not_stop_the_run() {
    // 45 operations at capacity 20: the second envelope call is rejected,
    // losing its 20 operations; the other 25 succeed.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::success())
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::success())
        .mount(&server)
        .await;

    let report = orchestrator_for(&server, 20)
        .run(create_drafts(45), None)
        .await
        .unwrap();

    assert_eq!(report.succeeded_count(), 25);
    assert_eq!(report.failed_count(), 20);
    assert!(report.batches[0].transport_error.is_none());
    assert!(report.batches[1].transport_error.is_some());
    assert!(report.batches[2].transport_error.is_none());

    // The lost batch occupies positions 20..40 of the aggregated outcomes
    assert!(report.outcomes[..20].iter().all(|o| o.succeeded));
    assert!(
        report.outcomes[20..40]
            .iter()
            .all(|o| o.error.as_deref() == Some(correlator::TRANSPORT_FAILURE))
    );
    assert!(report.outcomes[40..].iter().all(|o| o.succeeded));

    // Everything that succeeded is eligible for compensation
    assert_eq!(report.created_ids().len(), 25);
}

#[tokio::test]
async fn test_concurrent_submission_preserves_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::success())
        .expect(5)
        .mount(&server)
        .await;

    let report = orchestrator_for(&server, 3)
        .with_max_concurrent_batches(5)
        .run(create_drafts(15), None)
        .await
        .unwrap();

    assert_eq!(report.succeeded_count(), 15);
    let indexes: Vec<usize> = report.batches.iter().map(|b| b.index).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
    // Within-batch correlation ids restart at every batch boundary
    let ids: Vec<&str> = report
        .outcomes
        .iter()
        .map(|o| o.correlation_id.as_str())
        .collect();
    assert_eq!(&ids[..6], &["0", "1", "2", "0", "1", "2"]);
}

#[tokio::test]
async fn test_empty_input_completes_without_submissions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::success())
        .expect(0)
        .mount(&server)
        .await;

    let report = orchestrator_for(&server, 20).run(vec![], None).await.unwrap();

    assert_eq!(report.total_operations(), 0);
    assert!(report.batches.is_empty());
    assert_eq!(report.phase, RunPhase::Done);
}

#[tokio::test]
async fn test_invalid_capacity_aborts_before_any_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::success())
        .expect(0)
        .mount(&server)
        .await;

    let err = orchestrator_for(&server, 0)
        .run(create_drafts(3), None)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphBatchError::Config(_)));
}

// ==================== Authentication ====================

#[tokio::test]
async fn test_auth_failure_aborts_run_before_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::success())
        .expect(0)
        .mount(&server)
        .await;
    // The authority rejects the client credentials
    Mock::given(method("POST"))
        .and(path_regex(r"^/.*/oauth2/v2\.0/token$"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let credentials = Arc::new(
        ClientCredentialsProvider::with_token_url(
            token_url(&server),
            "client",
            "wrong-secret",
            "scope",
        )
        .unwrap(),
    );
    let submitter = BatchSubmitter::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let orchestrator = BatchOrchestrator::new(credentials, submitter, 20);

    let err = orchestrator.run(create_drafts(3), None).await.unwrap_err();
    assert!(matches!(err, GraphBatchError::Auth(_)));
}

#[tokio::test]
async fn test_run_uses_token_from_credential_provider() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, TEST_TOKEN).await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .and(wiremock::matchers::bearer_token(TEST_TOKEN))
        .respond_with(BatchResponder::success())
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Arc::new(
        ClientCredentialsProvider::with_token_url(token_url(&server), "client", "secret", "scope")
            .unwrap(),
    );
    let submitter = BatchSubmitter::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let orchestrator = BatchOrchestrator::new(credentials, submitter, 20);

    let report = orchestrator.run(create_drafts(2), None).await.unwrap();
    assert_eq!(report.succeeded_count(), 2);
}

// ==================== Compensation ====================

#[tokio::test]
async fn test_opt_in_compensation_deletes_created_resources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::success())
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"/events/evt-\d+$"))
        .respond_with(ResponseTemplate::new(204))
        .expect(5)
        .mount(&server)
        .await;

    let report = orchestrator_for(&server, 2)
        .run(create_drafts(5), Some(&events_path()))
        .await
        .unwrap();

    let compensation = report.compensation.as_ref().unwrap();
    assert_eq!(compensation.planned, 5);
    assert_eq!(compensation.succeeded, 5);
    assert_eq!(compensation.failed, 0);
}

#[tokio::test]
async fn test_compensation_is_skipped_without_opt_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::success())
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"/events/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let report = orchestrator_for(&server, 2)
        .run(create_drafts(4), None)
        .await
        .unwrap();
    assert!(report.compensation.is_none());
}

// ==================== Cancellation ====================

#[tokio::test]
async fn test_cancelled_run_skips_submissions_but_still_reports() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/$batch"))
        .respond_with(BatchResponder::success())
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator_for(&server, 20);
    orchestrator.cancel_flag().cancel();

    let report = orchestrator.run(create_drafts(45), None).await.unwrap();

    assert_eq!(report.total_operations(), 45);
    assert_eq!(report.succeeded_count(), 0);
    assert!(
        report
            .outcomes
            .iter()
            .all(|o| o.error.as_deref() == Some(correlator::CANCELLED))
    );
}
