#[allow(unused)]
use utils::*;

use abench::prelude::*;
use abench::{ConfigError, OperationError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
#[ntest::timeout(20_000)]
async fn completes_every_request_exactly_once() {
    init();

    let calls = Arc::new(AtomicUsize::new(0));
    let operation = {
        let calls = Arc::clone(&calls);
        move || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::Relaxed);
                tokio::time::sleep(Duration::from_millis(1)).await;
                Ok::<_, OperationError>(true)
            }
        }
    };

    let report = run(operation, RunConfig::new(40, 8)).await.unwrap();

    assert_eq!(calls.load(Ordering::Relaxed), 40);
    assert_eq!(report.requests, 40);
    assert_eq!(report.failed, 0);
    assert_eq!(report.errored, 0);
    assert!(report.throughput > 0.0);
    assert!(report.min_latency_ms <= report.avg_latency_ms);
    assert!(report.avg_latency_ms <= report.max_latency_ms);

    let counted: u64 = report.buckets.iter().map(|b| b.count).sum();
    assert_eq!(counted, 40);
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn errors_are_counted_but_never_abort_the_run() {
    init();

    let calls = Arc::new(AtomicUsize::new(0));
    let operation = {
        let calls = Arc::clone(&calls);
        move || {
            let calls = Arc::clone(&calls);
            async move {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if call == 2 || call == 4 {
                    Err(anyhow::anyhow!("simulated error on call {call}").into())
                } else {
                    Ok::<_, OperationError>(true)
                }
            }
        }
    };

    let mut bench = Benchmark::new(operation).requests(5).concurrency(5);
    let mut events = bench.subscribe();
    let report = bench.await.unwrap();

    assert_eq!(report.requests, 5);
    assert_eq!(report.errored, 2);
    assert_eq!(report.failed, 0);

    let mut error_events = 0;
    let mut progress_events = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            RunEvent::Error(_) => error_events += 1,
            RunEvent::Progress { .. } => progress_events += 1,
        }
    }
    assert_eq!(error_events, 2);
    // 5 requests means stage_size == 0: no progress checkpoints at all
    assert_eq!(progress_events, 0);
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn logical_failures_are_counted_separately() {
    init();

    let calls = Arc::new(AtomicUsize::new(0));
    let operation = {
        let calls = Arc::clone(&calls);
        move || {
            let calls = Arc::clone(&calls);
            async move {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok::<_, OperationError>(call % 3 != 0)
            }
        }
    };

    let report = run(operation, RunConfig::new(12, 4)).await.unwrap();

    assert_eq!(report.failed, 4);
    assert_eq!(report.errored, 0);
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn progress_checkpoints_follow_stage_truncation() {
    init();

    let operation = || async { Ok::<_, OperationError>(true) };

    let mut bench = Benchmark::new(operation).requests(40).concurrency(4);
    let mut events = bench.subscribe();
    bench.await.unwrap();

    let mut checkpoints = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let RunEvent::Progress { finished } = event {
            checkpoints.push(finished);
        }
    }
    assert_eq!(checkpoints, vec![4, 8, 12, 16, 20, 24, 28, 32, 36, 40]);
}

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(20_000)]
async fn in_flight_operations_never_exceed_concurrency() {
    init();

    let in_flight = Arc::new(AtomicUsize::new(0));
    let high_water = Arc::new(AtomicUsize::new(0));
    let operation = {
        let in_flight = Arc::clone(&in_flight);
        let high_water = Arc::clone(&high_water);
        move || {
            let in_flight = Arc::clone(&in_flight);
            let high_water = Arc::clone(&high_water);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                high_water.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, OperationError>(true)
            }
        }
    };

    let report = run(operation, RunConfig::new(60, 6)).await.unwrap();

    assert_eq!(report.requests, 60);
    assert!(high_water.load(Ordering::SeqCst) <= 6);
}

#[tokio::test]
async fn invalid_configs_fail_fast() {
    init();

    let operation = || async { Ok::<_, OperationError>(true) };

    assert!(matches!(
        run(operation, RunConfig::new(0, 5)).await,
        Err(ConfigError::NoRequests)
    ));
    assert!(matches!(
        run(operation, RunConfig::new(10, 0)).await,
        Err(ConfigError::NoConcurrency)
    ));
    assert!(matches!(
        run(operation, RunConfig::new(3, 5)).await,
        Err(ConfigError::ConcurrencyExceedsRequests { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(30_000)]
async fn jittered_latencies_fill_the_histogram() {
    init();

    let operation = || async {
        use rand_distr::{Distribution, Normal};
        let normal = Normal::new(5.0, 1.0).unwrap();
        let millis: f64 = normal.sample(&mut rand::thread_rng()).max(0.0);
        tokio::time::sleep(Duration::from_secs_f64(millis / 1_000.0)).await;
        Ok::<_, OperationError>(true)
    };

    let report = run(operation, RunConfig::new(50, 10)).await.unwrap();

    let counted: u64 = report.buckets.iter().map(|b| b.count).sum();
    assert_eq!(counted, 50);
    assert!(report.min_latency_ms <= report.max_latency_ms);
    assert!(report.avg_latency_ms > 0.0);
    tracing::info!("{report}");
}
