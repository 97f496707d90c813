use std::time::Duration;

use rephrase::error::Error;
use rephrase::pipeline::retry::{AttemptOutcome, BatchOutcome, RetryPolicy};

mod common;
use common::{records, texts, FlakyTransform, Step};

fn policy(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts).delay(Duration::ZERO)
}

#[tokio::test]
async fn mismatch_then_success_commits_second_attempt() {
    let input = texts(&records(3));
    let mut transform = FlakyTransform::new([Step::Short, Step::Ok]);

    let outcome = policy(2).run(0, &input, &mut transform).await;

    match outcome {
        BatchOutcome::Committed {
            transformed,
            attempts,
        } => {
            assert_eq!(attempts, 2);
            assert_eq!(transformed, vec!["TEXT 0", "TEXT 1", "TEXT 2"]);
        }
        other => panic!("expected commit, got {other:?}"),
    }
    assert_eq!(transform.attempts(), 2);
}

#[tokio::test]
async fn every_attempt_mismatched_exhausts_without_error() {
    let input = texts(&records(4));
    let mut transform = FlakyTransform::new([Step::Short, Step::Short, Step::Short]);

    let outcome = policy(3).run(7, &input, &mut transform).await;

    match outcome {
        BatchOutcome::Failed { attempts, reason } => {
            assert_eq!(attempts, 3);
            assert!(matches!(
                reason,
                Error::BatchSizeMismatch {
                    expected: 4,
                    actual: 3
                }
            ));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(transform.attempts(), 3);
}

#[tokio::test]
async fn single_attempt_policy_never_retries() {
    let input = texts(&records(2));
    let mut transform = FlakyTransform::new([Step::Fail, Step::Ok]);

    let outcome = policy(1).run(0, &input, &mut transform).await;

    assert!(!outcome.is_committed());
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(transform.attempts(), 1);
}

#[tokio::test]
async fn service_errors_are_retried() {
    let input = texts(&records(2));
    let mut transform = FlakyTransform::new([Step::Fail, Step::Fail]);

    let outcome = policy(3).run(0, &input, &mut transform).await;

    assert!(outcome.is_committed());
    assert_eq!(outcome.attempts(), 3);
}

#[tokio::test]
async fn permanent_errors_stop_immediately() {
    let input = texts(&records(2));
    let mut transform = FlakyTransform::new([Step::Fatal]);

    let outcome = policy(5).run(0, &input, &mut transform).await;

    match outcome {
        BatchOutcome::Failed { attempts, reason } => {
            assert_eq!(attempts, 1);
            assert!(matches!(reason, Error::Corpus { .. }));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(transform.attempts(), 1);
}

#[tokio::test]
async fn retry_if_can_narrow_retryable_errors() {
    let input = texts(&records(2));
    let mut transform = FlakyTransform::new([Step::Fail]);

    let outcome = policy(4)
        .retry_if(|err| !matches!(err, Error::Service { .. }))
        .run(0, &input, &mut transform)
        .await;

    assert!(!outcome.is_committed());
    assert_eq!(transform.attempts(), 1);
}

#[test]
fn classify_maps_results_to_outcomes() {
    let policy = policy(2);

    assert!(matches!(
        policy.classify(2, Ok(vec!["a".into(), "b".into()])),
        AttemptOutcome::Success(_)
    ));
    assert!(matches!(
        policy.classify(2, Ok(vec!["a".into()])),
        AttemptOutcome::TransientFailure(Error::BatchSizeMismatch { .. })
    ));
    assert!(matches!(
        policy.classify(2, Err(Error::service("timeout"))),
        AttemptOutcome::TransientFailure(_)
    ));
    assert!(matches!(
        policy.classify(2, Err(Error::invalid_config("nope"))),
        AttemptOutcome::PermanentFailure(_)
    ));
}

#[test]
fn zero_attempts_is_clamped_to_one() {
    assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
}
