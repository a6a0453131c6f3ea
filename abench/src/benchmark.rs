//! Run entry points and the `Benchmark` future handle.
use crate::aggregator::Aggregator;
use crate::dispatcher::Dispatcher;
use abench_core::{ConfigError, Report, RunConfig};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::mpsc;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Boxed error returned by an operation under test.
pub type OperationError = Box<dyn std::error::Error + Send + Sync>;

/// Lifecycle notifications emitted while a run is in progress.
#[derive(Debug)]
pub enum RunEvent {
    /// A progress checkpoint: `finished` operations have completed so far.
    Progress { finished: usize },
    /// An operation completed with an error. The run continues.
    Error(OperationError),
}

/// Run `operation` `config.requests` times at `config.concurrency` lanes and
/// return the finalized [`Report`].
///
/// The operation resolves to `Ok(true)` on success, `Ok(false)` for a logical
/// failure, and `Err(_)` for a hard error. Errors and failures are counted
/// but never abort the run; only an invalid config fails fast.
pub async fn run<T, F>(operation: T, config: RunConfig) -> Result<Report, ConfigError>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<bool, OperationError>> + Send,
{
    Benchmark::with_config(operation, config).await
}

/// Benchmark run handle
///
/// A one-shot future: awaiting it performs the run and yields the
/// [`Report`]. Configure with the builder methods, and optionally
/// [`subscribe`](Self::subscribe) for progress/error events before awaiting.
#[pin_project::pin_project]
pub struct Benchmark<T> {
    operation: T,
    config: RunConfig,
    events: Option<mpsc::UnboundedSender<RunEvent>>,
    runner_fut: Option<Pin<Box<dyn Future<Output = Result<Report, ConfigError>> + Send>>>,
}

impl<T, F> Benchmark<T>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<bool, OperationError>> + Send,
{
    pub fn new(operation: T) -> Self {
        Self::with_config(operation, RunConfig::default())
    }

    pub fn with_config(operation: T, config: RunConfig) -> Self {
        Self {
            operation,
            config,
            events: None,
            runner_fut: None,
        }
    }

    /// Total number of operations to issue.
    pub fn requests(mut self, requests: usize) -> Self {
        self.config.requests = requests;
        self
    }

    /// Number of lanes kept in flight.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Subscribe to progress and error events for this run. Dropping the
    /// receiver cancels the subscription; later events are discarded.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RunEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }
}

impl<T, F> Future for Benchmark<T>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<bool, OperationError>> + Send,
{
    type Output = Result<Report, ConfigError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.runner_fut.is_none() {
            let operation = self.operation.clone();
            let config = self.config.clone();
            let events = self.events.take();
            self.runner_fut = Some(Box::pin(async move {
                run_benchmark(operation, config, events).await
            }));
        }

        if let Some(runner) = &mut self.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

#[instrument(name = "benchmark", skip_all, fields(requests = config.requests, concurrency = config.concurrency))]
async fn run_benchmark<T, F>(
    operation: T,
    config: RunConfig,
    events: Option<mpsc::UnboundedSender<RunEvent>>,
) -> Result<Report, ConfigError>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<bool, OperationError>> + Send,
{
    config.validate()?;
    info!(
        "Running {} requests at concurrency {}",
        config.requests, config.concurrency
    );

    let (outcome_tx, mut outcome_rx) = mpsc::channel(config.concurrency);
    let mut aggregator = Aggregator::new(&config, events);
    let lanes = Dispatcher::new(operation, &config).spawn(outcome_tx);

    let report = loop {
        let outcome = outcome_rx
            .recv()
            .await
            .expect("outcome channel closed before the run completed (operation panicked?)");
        if let Some(report) = aggregator.on_outcome(outcome) {
            break report;
        }
    };

    // remaining lanes find the budget exhausted and exit on their own
    for lane in lanes {
        let _ = lane.await;
    }

    info!("Benchmark complete");
    Ok(report)
}
