//! Job store integration tests.
//!
//! These run against a real Redis instance (REDIS_URL, default localhost).

use std::time::Duration;

use slidepdf_jobstore::{JobStore, StoreConfig, StoreError};
use slidepdf_models::{Job, JobState};

fn test_store() -> JobStore {
    let config = StoreConfig {
        redis_url: std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        // Isolate each test run from previous ones
        key_prefix: format!("slidepdf-test-{}", uuid::Uuid::new_v4()),
        poll_interval: Duration::from_millis(10),
        poll_max_interval: Duration::from_millis(50),
    };
    JobStore::new(config).expect("Failed to create job store")
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_create_and_get() {
    let store = test_store();

    let job = Job::new("deck.pptx", "/tmp/slidepdf/in.pptx");
    store.create(&job).await.unwrap();

    let fetched = store.get(&job.id).await.unwrap().expect("job should exist");
    assert_eq!(fetched, job);
    assert_eq!(fetched.state, JobState::Queued);
    assert_eq!(store.pending_len().await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_claim_transitions_to_processing() {
    let store = test_store();

    let job = Job::new("deck.pptx", "/tmp/slidepdf/in.pptx");
    store.create(&job).await.unwrap();

    let claimed = store.claim_next().await.unwrap();
    assert_eq!(claimed.id, job.id);
    assert_eq!(claimed.state, JobState::Processing);

    // The stored record reflects the transition
    let fetched = store.get(&job.id).await.unwrap().unwrap();
    assert_eq!(fetched.state, JobState::Processing);
    assert_eq!(store.pending_len().await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_claim_exclusivity() {
    let store = std::sync::Arc::new(test_store());

    let job = Job::new("deck.pptx", "/tmp/slidepdf/in.pptx");
    store.create(&job).await.unwrap();

    // Two concurrent claimants, one job: exactly one claim resolves, the
    // other stays parked in its poll loop until the timeout fires.
    let a = {
        let store = std::sync::Arc::clone(&store);
        tokio::spawn(async move {
            tokio::time::timeout(Duration::from_millis(500), store.claim_next()).await
        })
    };
    let b = {
        let store = std::sync::Arc::clone(&store);
        tokio::spawn(async move {
            tokio::time::timeout(Duration::from_millis(500), store.claim_next()).await
        })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let claimed: Vec<_> = results.into_iter().filter_map(|r| r.ok()).collect();
    assert_eq!(claimed.len(), 1, "exactly one claimant should win");
    assert_eq!(claimed[0].as_ref().unwrap().id, job.id);
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_complete_sets_done_and_result() {
    let store = test_store();

    let job = Job::new("deck.pptx", "/tmp/slidepdf/in.pptx");
    store.create(&job).await.unwrap();
    let claimed = store.claim_next().await.unwrap();

    store
        .complete(&claimed.id, "https://store/conversions/2025/01/01/deck.pdf?sig=x")
        .await
        .unwrap();

    let fetched = store.get(&job.id).await.unwrap().unwrap();
    assert_eq!(fetched.state, JobState::Done);
    assert_eq!(
        fetched.result.as_deref(),
        Some("https://store/conversions/2025/01/01/deck.pdf?sig=x")
    );
    assert!(fetched.error.is_none());
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_fail_sets_failed_and_error() {
    let store = test_store();

    let job = Job::new("deck.pptx", "/tmp/slidepdf/in.pptx");
    store.create(&job).await.unwrap();
    let claimed = store.claim_next().await.unwrap();

    store
        .fail(&claimed.id, "conversion daemon returned 500")
        .await
        .unwrap();

    let fetched = store.get(&job.id).await.unwrap().unwrap();
    assert_eq!(fetched.state, JobState::Failed);
    assert_eq!(
        fetched.error.as_deref(),
        Some("conversion daemon returned 500")
    );
    assert!(fetched.result.is_none());
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_complete_requires_processing() {
    let store = test_store();

    let job = Job::new("deck.pptx", "/tmp/slidepdf/in.pptx");
    store.create(&job).await.unwrap();

    // Still queued: completing must be refused
    let err = store
        .complete(&job.id, "https://store/x.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::StateConflict { .. }));

    // Terminal states never revert
    let claimed = store.claim_next().await.unwrap();
    store.fail(&claimed.id, "boom").await.unwrap();
    let err = store
        .complete(&job.id, "https://store/x.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::StateConflict { .. }));

    let fetched = store.get(&job.id).await.unwrap().unwrap();
    assert_eq!(fetched.state, JobState::Failed);
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_unknown_job_not_found() {
    let store = test_store();

    let missing = slidepdf_models::JobId::from_string("does-not-exist");
    assert!(store.get(&missing).await.unwrap().is_none());
    assert!(matches!(
        store.complete(&missing, "https://store/x.pdf").await,
        Err(StoreError::NotFound(_))
    ));
}
