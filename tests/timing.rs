use std::time::{Duration, Instant};

use asyncflow::{
    Error,
    task_ext::TaskExt,
    timing::{Sleep, millis, sleep, with_timeout},
};
use futures::FutureExt;

#[tokio::test(flavor = "multi_thread")]
async fn sleep_waits_for_duration() {
    let started = Instant::now();
    sleep(Duration::from_millis(80)).await;
    let elapsed = started.elapsed();

    assert!(
        elapsed >= Duration::from_millis(80),
        "Sleep returned early after {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_millis(300),
        "Sleep overshot: {elapsed:?}"
    );
}

#[test]
fn zero_sleep_is_ready_immediately() {
    let mut s = Sleep::new(Duration::ZERO);
    assert!(s.is_elapsed());
    assert_eq!((&mut s).now_or_never(), Some(()));
}

#[tokio::test(flavor = "multi_thread")]
async fn sleeps_overlap_instead_of_blocking() {
    let started = Instant::now();
    futures::join!(
        sleep(Duration::from_millis(100)),
        sleep(Duration::from_millis(100)),
        sleep(Duration::from_millis(100)),
    );
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(250),
        "Three concurrent sleeps should take about one delay, took {elapsed:?}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn sleep_does_not_block_single_threaded_runtime() {
    let started = Instant::now();
    let (_, ticks) = futures::join!(sleep(Duration::from_millis(120)), async {
        let mut ticks = 0;
        for _ in 0..4 {
            sleep(Duration::from_millis(20)).await;
            ticks += 1;
        }
        ticks
    });

    assert_eq!(ticks, 4, "Other task should progress during the long sleep");
    assert!(started.elapsed() < Duration::from_millis(300));
}

#[tokio::test(flavor = "multi_thread")]
async fn timeout_passes_through_fast_future() {
    let result = async {
        sleep(Duration::from_millis(20)).await;
        42
    }
    .timeout(Duration::from_millis(200))
    .await;

    assert_eq!(result, Ok(42));
}

#[tokio::test(flavor = "multi_thread")]
async fn timeout_fires_for_slow_future() {
    let limit = Duration::from_millis(100);
    let started = Instant::now();
    let result = sleep(Duration::from_millis(400)).timeout(limit).await;
    let elapsed = started.elapsed();

    assert_eq!(result, Err(Error::timeout(limit)));
    assert!(elapsed >= limit, "Timed out early after {elapsed:?}");
    assert!(
        elapsed < Duration::from_millis(250),
        "Timeout should fire close to the limit, took {elapsed:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn timeout_message_names_the_limit() {
    let err = with_timeout(
        async {
            sleep(Duration::from_millis(300)).await;
            Ok::<(), Error>(())
        },
        Duration::from_millis(50),
    )
    .await
    .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.to_string(), "timeout after 50ms");
}

#[tokio::test(flavor = "multi_thread")]
async fn with_timeout_keeps_inner_error() {
    let err = with_timeout(
        async { Err::<(), _>(Error::simulated("inner")) },
        Duration::from_millis(100),
    )
    .await
    .unwrap_err();

    assert_eq!(err, Error::simulated("inner"));
}

#[test]
fn timeout_countdown_starts_at_creation() {
    let limit = Duration::from_millis(50);
    let timeout = futures::future::pending::<()>().timeout(limit);
    assert_eq!(timeout.limit(), limit);

    std::thread::sleep(Duration::from_millis(60));
    let started = Instant::now();
    let result = futures::executor::block_on(timeout);

    assert!(result.is_err());
    assert!(
        started.elapsed() < Duration::from_millis(30),
        "Deadline should already have passed when first polled"
    );
}

#[test]
fn sleep_works_on_other_executors() {
    let started = Instant::now();
    smol::block_on(sleep(Duration::from_millis(30)));
    futures::executor::block_on(sleep(Duration::from_millis(30)));
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[test]
fn timeout_can_be_unwrapped() {
    let wrapped = async { 5 }.timeout(Duration::from_secs(1));
    assert_eq!(futures::executor::block_on(wrapped.inner()), 5);
}

#[tokio::test(flavor = "current_thread")]
async fn many_short_sleeps_are_not_held_up_by_long_timeouts() {
    let started = Instant::now();
    let results = futures::future::join_all((0..200).map(|_| {
        sleep(Duration::from_millis(1)).timeout(Duration::from_secs(3))
    }))
    .await;
    let elapsed = started.elapsed();

    assert!(results.iter().all(Result::is_ok));
    assert!(
        elapsed < Duration::from_millis(500),
        "Pending deadlines must not delay other sleeps, took {elapsed:?}"
    );
}

#[test]
fn dropped_sleeps_do_not_delay_new_ones() {
    let abandoned: Vec<_> = (0..100)
        .map(|_| sleep(Duration::from_secs(5)).timeout(Duration::from_millis(1)))
        .collect();
    for outcome in futures::executor::block_on(futures::future::join_all(abandoned)) {
        assert!(outcome.unwrap_err().is_timeout());
    }

    let started = Instant::now();
    futures::executor::block_on(sleep(Duration::from_millis(20)));
    assert!(
        started.elapsed() < Duration::from_millis(300),
        "Fresh sleep was delayed by abandoned ones"
    );
}

#[test]
fn millis_saturates_instead_of_wrapping() {
    assert_eq!(millis(Duration::from_millis(250)), 250);
    assert_eq!(millis(Duration::from_micros(1_999)), 1);
    assert_eq!(millis(Duration::MAX), u64::MAX);
}
