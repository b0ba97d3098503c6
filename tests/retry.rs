use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::{Duration, Instant},
};

use asyncflow::{
    Error, SimulatedOperation,
    retry::{RetryPolicy, retry},
};

#[test]
fn backoff_grows_linearly() {
    let policy = RetryPolicy::new(5, Duration::from_millis(40));

    assert_eq!(policy.backoff(1), Duration::from_millis(40));
    assert_eq!(policy.backoff(2), Duration::from_millis(80));
    assert_eq!(policy.backoff(4), Duration::from_millis(160));
    // 40 * (1 + 2 + 3 + 4)
    assert_eq!(policy.total_backoff(), Duration::from_millis(400));
}

#[test]
fn zero_attempts_means_one() {
    let policy = RetryPolicy::new(0, Duration::from_millis(10));
    assert_eq!(policy.max_attempts(), 1);
    assert_eq!(policy.total_backoff(), Duration::ZERO);
}

#[test]
fn default_policy() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts(), 3);
    assert_eq!(policy.base_delay(), Duration::from_millis(100));
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_budget_returns_last_error() {
    let policy = RetryPolicy::new(3, Duration::from_millis(30));
    let calls = AtomicU32::new(0);
    let started = Instant::now();

    let result: Result<(), String> = retry(policy, |attempt| {
        calls.fetch_add(1, Ordering::Relaxed);
        async move { Err(format!("attempt {attempt} failed")) }
    })
    .await;
    let elapsed = started.elapsed();

    assert_eq!(result, Err("attempt 3 failed".to_string()));
    assert_eq!(calls.load(Ordering::Relaxed), 3, "Should never exceed the budget");

    // 30 * (1 + 2)
    assert_eq!(policy.total_backoff(), Duration::from_millis(90));
    assert!(
        elapsed >= policy.total_backoff(),
        "Waited less than the backoff schedule: {elapsed:?}"
    );
    assert!(
        elapsed < policy.total_backoff() + Duration::from_millis(80),
        "No wait should follow the last attempt: {elapsed:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn success_on_attempt_k_stops_retrying() {
    let policy = RetryPolicy::new(5, Duration::from_millis(100));
    let calls = AtomicU32::new(0);
    let started = Instant::now();

    let result = retry(policy, |attempt| {
        calls.fetch_add(1, Ordering::Relaxed);
        async move {
            if attempt < 2 {
                Err(Error::simulated(format!("try {attempt}")))
            } else {
                Ok(attempt)
            }
        }
    })
    .await;
    let elapsed = started.elapsed();

    assert_eq!(result, Ok(2));
    assert_eq!(calls.load(Ordering::Relaxed), 2);
    assert!(elapsed >= Duration::from_millis(100));
    // A wait after the successful attempt would add another 200ms.
    assert!(
        elapsed < Duration::from_millis(250),
        "Waited after success: {elapsed:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn single_attempt_fails_without_waiting() {
    let policy = RetryPolicy::new(1, Duration::from_secs(5));
    let calls = AtomicU32::new(0);
    let started = Instant::now();

    let result: Result<(), Error> = retry(policy, |_| {
        calls.fetch_add(1, Ordering::Relaxed);
        async { Err(Error::simulated("once")) }
    })
    .await;

    assert_eq!(result, Err(Error::simulated("once")));
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn reliable_operation_succeeds_first_try() {
    let policy = RetryPolicy::new(3, Duration::from_millis(200));
    let op = SimulatedOperation::new("steady", Duration::from_millis(20));
    let attempts = AtomicU32::new(0);
    let started = Instant::now();

    let result = retry(policy, |attempt| {
        attempts.store(attempt, Ordering::Relaxed);
        op.run()
    })
    .await
    .unwrap();

    assert_eq!(result.name(), "steady");
    assert_eq!(attempts.load(Ordering::Relaxed), 1);
    assert!(
        started.elapsed() < Duration::from_millis(200),
        "No backoff should be incurred"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn unreliable_operation_exhausts_with_its_own_error() {
    let policy = RetryPolicy::new(2, Duration::from_millis(10));
    let op = SimulatedOperation::new("flaky", Duration::from_millis(5)).failure_probability(1.0);

    let err = retry(policy, |_| op.run()).await.unwrap_err();
    assert_eq!(err.to_string(), "[flaky] failed (simulated)");
}
