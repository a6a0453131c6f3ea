//! An asynchronous micro-benchmark harness.
//!
//! `abench` drives a user-supplied async operation a fixed number of times at
//! a fixed concurrency level, measures per-call latency at microsecond
//! resolution, and produces a histogram-style summary [`Report`]:
//! throughput, min/max/avg latency, per-bucket latency counts, and
//! failure/error counts.
//!
//! The operation resolves to `Ok(true)` on success, `Ok(false)` for a
//! logical failure, and `Err(_)` for a hard error; neither aborts the run.
//!
//! ```no_run
//! use abench::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let report = Benchmark::new(|| async {
//!         tokio::time::sleep(Duration::from_millis(3)).await;
//!         Ok::<_, abench::OperationError>(true)
//!     })
//!     .requests(1_000)
//!     .concurrency(10)
//!     .await
//!     .expect("valid configuration");
//!
//!     println!("{report}");
//! }
//! ```
pub mod benchmark;

pub(crate) mod aggregator;
pub(crate) mod dispatcher;

pub use abench_core::{
    BucketBound, BucketCount, ConfigError, LatencyHistogram, Report, RunConfig, LATENCY_BUCKETS_MS,
};
pub use benchmark::{run, Benchmark, OperationError, RunEvent};

pub mod prelude {
    pub use crate::benchmark::{run, Benchmark, RunEvent};
    pub use abench_core::{Report, RunConfig};
}
