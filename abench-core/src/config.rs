use crate::{DEFAULT_CONCURRENCY, DEFAULT_REQUESTS, PROGRESS_CHECKPOINTS};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters of a single benchmark run. Immutable once the run starts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunConfig {
    /// Total number of operations to issue.
    pub requests: usize,
    /// Number of lanes kept in flight until the request budget is exhausted.
    pub concurrency: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            requests: DEFAULT_REQUESTS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl RunConfig {
    pub fn new(requests: usize, concurrency: usize) -> Self {
        Self {
            requests,
            concurrency,
        }
    }

    /// Checked before any dispatch; an invalid config never starts a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.requests == 0 {
            return Err(ConfigError::NoRequests);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::NoConcurrency);
        }
        if self.concurrency > self.requests {
            return Err(ConfigError::ConcurrencyExceedsRequests {
                concurrency: self.concurrency,
                requests: self.requests,
            });
        }
        Ok(())
    }

    /// Completions between progress checkpoints. Integer division truncates;
    /// a run with fewer than [`PROGRESS_CHECKPOINTS`] requests has a stage
    /// size of 0 and emits no progress at all.
    pub fn stage_size(&self) -> usize {
        self.requests / PROGRESS_CHECKPOINTS
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("requests must be greater than zero")]
    NoRequests,

    #[error("concurrency must be greater than zero")]
    NoConcurrency,

    #[error("concurrency ({concurrency}) must not exceed requests ({requests})")]
    ConcurrencyExceedsRequests { concurrency: usize, requests: usize },
}
