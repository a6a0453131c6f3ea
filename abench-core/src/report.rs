use crate::{BucketBound, LatencyHistogram};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime};

/// Count and share of one latency bucket.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BucketCount {
    pub bound: BucketBound,
    pub count: u64,
    /// Share of all finished requests, percent, 1 decimal digit.
    pub rate: f64,
}

/// Immutable summary of one finished benchmark run.
///
/// Timing and throughput fields are fixed to 3 decimal digits, bucket rates
/// to 1 decimal digit. Latencies are milliseconds.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Report {
    /// Wall-clock instant the run finalized.
    pub timestamp: SystemTime,
    pub requests: usize,
    pub concurrency: usize,
    /// Wall-clock time from run start to finalization.
    pub elapsed: Duration,
    /// Operations that completed but reported a logical failure.
    pub failed: usize,
    /// Operations that completed with an error.
    pub errored: usize,
    /// Requests per second over the whole run.
    pub throughput: f64,
    pub avg_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    /// One entry per histogram bucket, ascending boundaries, overflow last.
    pub buckets: Vec<BucketCount>,
}

impl Report {
    /// Assemble the final report from the raw run state.
    pub fn assemble(
        requests: usize,
        concurrency: usize,
        elapsed: Duration,
        failed: usize,
        errored: usize,
        latencies: &[f64],
        histogram: &LatencyHistogram,
    ) -> Self {
        debug_assert!(!latencies.is_empty(), "report assembled with no latencies");

        let finished = latencies.len();
        let elapsed_ms = elapsed.as_secs_f64() * 1_000.0;

        let mut min = f64::INFINITY;
        let mut max: f64 = 0.0;
        let mut sum = 0.0;
        for &millis in latencies {
            sum += millis;
            min = min.min(millis);
            max = max.max(millis);
        }

        let buckets = histogram
            .buckets()
            .map(|(bound, count)| BucketCount {
                bound,
                count,
                rate: fixed(count as f64 / finished as f64 * 100.0, 1),
            })
            .collect();

        Self {
            timestamp: SystemTime::now(),
            requests,
            concurrency,
            elapsed,
            failed,
            errored,
            throughput: fixed(requests as f64 / elapsed_ms * 1_000.0, 3),
            avg_latency_ms: fixed(sum / requests as f64, 3),
            min_latency_ms: fixed(min, 3),
            max_latency_ms: fixed(max, 3),
            buckets,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Benchmark finished at {}",
            humantime::format_rfc3339_seconds(self.timestamp)
        )?;
        writeln!(f)?;
        writeln!(f, "Concurrency level:      {}", self.concurrency)?;
        writeln!(
            f,
            "Time taken for tests:   {:.3} seconds",
            self.elapsed.as_secs_f64()
        )?;
        writeln!(f, "Complete requests:      {}", self.requests)?;
        writeln!(f, "Failed requests:        {}", self.failed)?;
        writeln!(f, "Errors:                 {}", self.errored)?;
        writeln!(f, "Requests per second:    {:.3} [#/sec]", self.throughput)?;
        writeln!(
            f,
            "Latency (ms):           avg {:.3}, min {:.3}, max {:.3}",
            self.avg_latency_ms, self.min_latency_ms, self.max_latency_ms
        )?;
        writeln!(f)?;
        writeln!(f, "Percentage of requests within latency buckets (ms):")?;
        for bucket in &self.buckets {
            let prefix = match bucket.bound {
                BucketBound::Millis(_) => "<=",
                BucketBound::Overflow => "> ",
            };
            let label = match bucket.bound {
                BucketBound::Millis(bound) => bound.to_string(),
                BucketBound::Overflow => "1000".to_string(),
            };
            writeln!(
                f,
                "  {prefix} {label:<6} {count:>8}  {rate:>5.1}%",
                count = bucket.count,
                rate = bucket.rate
            )?;
        }
        Ok(())
    }
}

/// Round to a fixed number of decimal digits, half away from zero.
fn fixed(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}
