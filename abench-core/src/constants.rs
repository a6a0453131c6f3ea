/// The default number of requests issued per run
pub const DEFAULT_REQUESTS: usize = 100;

/// The default number of concurrent lanes
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Progress checkpoints per run; `stage_size = requests / PROGRESS_CHECKPOINTS`
pub const PROGRESS_CHECKPOINTS: usize = 10;

/// Upper boundaries (milliseconds, inclusive) of the latency histogram
/// buckets. Latencies above the last boundary land in the overflow bucket.
pub const LATENCY_BUCKETS_MS: [f64; 19] = [
    0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 15.0, 20.0, 30.0, 50.0, 100.0, 200.0,
    500.0, 1000.0,
];
