use crate::aggregator::Outcome;
use crate::benchmark::OperationError;
use abench_core::RunConfig;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Owns the fixed-size pool of concurrent lanes.
///
/// Each lane claims request slots from a shared counter until the budget is
/// exhausted, timing one operation at a time. At most `concurrency`
/// operations are ever in flight since a lane only claims its next slot after
/// its previous operation completed.
pub(crate) struct Dispatcher<T> {
    operation: T,
    requests: usize,
    concurrency: usize,
}

impl<T, F> Dispatcher<T>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<bool, OperationError>> + Send,
{
    pub fn new(operation: T, config: &RunConfig) -> Self {
        Self {
            operation,
            requests: config.requests,
            concurrency: config.concurrency,
        }
    }

    pub fn spawn(&self, outcomes: mpsc::Sender<Outcome>) -> Vec<JoinHandle<()>> {
        let sent = Arc::new(AtomicUsize::new(0));
        (0..self.concurrency)
            .map(|lane| {
                let operation = self.operation.clone();
                let outcomes = outcomes.clone();
                let sent = Arc::clone(&sent);
                let requests = self.requests;
                tokio::spawn(async move {
                    loop {
                        // `sent` never passes `requests`; a failed claim ends the lane.
                        let claimed = sent
                            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                                (n < requests).then_some(n + 1)
                            });
                        if claimed.is_err() {
                            debug!("lane #{lane} done");
                            break;
                        }

                        let start = Instant::now();
                        let result = operation().await;
                        let outcome = Outcome::new(start.elapsed(), result);

                        if outcomes.send(outcome).await.is_err() {
                            // receiver hung up; nothing left to record
                            break;
                        }
                    }
                })
            })
            .collect()
    }
}
