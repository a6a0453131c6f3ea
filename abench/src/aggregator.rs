use crate::benchmark::{OperationError, RunEvent};
use abench_core::{LatencyHistogram, Report, RunConfig};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Result of one completed operation invocation.
#[derive(Debug)]
pub(crate) struct Outcome {
    latency: Duration,
    failed: bool,
    error: Option<OperationError>,
}

impl Outcome {
    pub fn new(latency: Duration, result: Result<bool, OperationError>) -> Self {
        match result {
            Ok(success) => Self {
                latency,
                failed: !success,
                error: None,
            },
            Err(error) => Self {
                latency,
                failed: false,
                error: Some(error),
            },
        }
    }
}

/// Single consumer of lane outcomes; owns every run counter.
///
/// All state mutation happens through [`on_outcome`](Self::on_outcome) on the
/// one task draining the outcome channel, so no synchronization beyond the
/// channel itself is needed regardless of how many lanes feed it.
pub(crate) struct Aggregator {
    requests: usize,
    concurrency: usize,
    stage_size: usize,
    finished: usize,
    failed: usize,
    errored: usize,
    /// Milliseconds, arrival order.
    latencies: Vec<f64>,
    histogram: LatencyHistogram,
    started_at: Instant,
    events: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl Aggregator {
    pub fn new(config: &RunConfig, events: Option<mpsc::UnboundedSender<RunEvent>>) -> Self {
        Self {
            requests: config.requests,
            concurrency: config.concurrency,
            stage_size: config.stage_size(),
            finished: 0,
            failed: 0,
            errored: 0,
            latencies: Vec::with_capacity(config.requests),
            histogram: LatencyHistogram::new(),
            started_at: Instant::now(),
            events,
        }
    }

    /// Fold one outcome into the run state. Returns the finalized report on
    /// the outcome that completes the run; the single-consumer discipline
    /// means this fires exactly once.
    pub fn on_outcome(&mut self, outcome: Outcome) -> Option<Report> {
        debug_assert!(
            self.finished < self.requests,
            "outcome received after run completion"
        );

        let millis = outcome.latency.as_micros() as f64 / 1_000.0;
        self.latencies.push(millis);
        self.histogram.record(millis);
        self.finished += 1;

        #[cfg(feature = "metrics")]
        {
            metrics::histogram!("abench_latency").record(outcome.latency.as_nanos() as f64);
            if outcome.error.is_some() {
                metrics::counter!("abench_error").increment(1);
            } else {
                metrics::counter!("abench_success").increment(1);
            }
            if outcome.failed {
                metrics::counter!("abench_failure").increment(1);
            }
        }

        if self.stage_size > 0 && self.finished % self.stage_size == 0 {
            info!("Completed {} requests", self.finished);
            self.emit(RunEvent::Progress {
                finished: self.finished,
            });
        }

        if let Some(error) = outcome.error {
            self.errored += 1;
            self.emit(RunEvent::Error(error));
        }
        if outcome.failed {
            self.failed += 1;
        }

        (self.finished == self.requests).then(|| self.finalize())
    }

    fn emit(&self, event: RunEvent) {
        if let Some(events) = &self.events {
            // subscriber may be gone; events are best-effort
            let _ = events.send(event);
        }
    }

    fn finalize(&self) -> Report {
        Report::assemble(
            self.requests,
            self.concurrency,
            self.started_at.elapsed(),
            self.failed,
            self.errored,
            &self.latencies,
            &self.histogram,
        )
    }
}
