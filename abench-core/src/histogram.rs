use crate::LATENCY_BUCKETS_MS;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bucket count including the overflow bucket.
pub const BUCKET_COUNT: usize = LATENCY_BUCKETS_MS.len() + 1;

/// Upper bound of one latency bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BucketBound {
    /// Latencies less than or equal to this many milliseconds.
    Millis(f64),
    /// Latencies above the last boundary.
    Overflow,
}

impl BucketBound {
    pub fn of(index: usize) -> Self {
        if index < LATENCY_BUCKETS_MS.len() {
            Self::Millis(LATENCY_BUCKETS_MS[index])
        } else {
            Self::Overflow
        }
    }
}

impl fmt::Display for BucketBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millis(bound) => write!(f, "{bound}"),
            Self::Overflow => write!(f, "1000+"),
        }
    }
}

/// Latency histogram over the fixed, non-uniform bucket table.
///
/// Classification is a first-match linear scan with inclusive boundaries: a
/// latency of exactly 1000.0 ms falls in the `1000` bucket, and only strictly
/// larger values overflow.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatencyHistogram {
    counts: [u64; BUCKET_COUNT],
}

impl LatencyHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one latency (milliseconds) into exactly one bucket.
    pub fn record(&mut self, millis: f64) {
        self.counts[bucket_index(millis)] += 1;
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Buckets in ascending boundary order, overflow last.
    pub fn buckets(&self) -> impl Iterator<Item = (BucketBound, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(index, count)| (BucketBound::of(index), *count))
    }
}

fn bucket_index(millis: f64) -> usize {
    LATENCY_BUCKETS_MS
        .iter()
        .position(|bound| millis <= *bound)
        .unwrap_or(LATENCY_BUCKETS_MS.len())
}
