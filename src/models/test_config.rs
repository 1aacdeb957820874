//! Load test configuration
//!
//! Defines the immutable parameters of a single run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors detected before a run starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Target URL must not be empty")]
    EmptyTarget,

    #[error("Request count must be greater than zero (got {0})")]
    InvalidRequestCount(usize),

    #[error("Concurrency must be at least 1 (got {0})")]
    InvalidConcurrency(usize),
}

/// Parameters of one load test run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
    /// Target URL
    pub url: String,
    /// Total number of requests to issue
    pub requests: usize,
    /// Number of concurrent workers
    pub concurrency: usize,
}

impl TestConfig {
    /// Create a validated configuration
    pub fn new(
        url: impl Into<String>,
        requests: usize,
        concurrency: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            url: url.into(),
            requests,
            concurrency,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the run invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        if self.requests == 0 {
            return Err(ConfigError::InvalidRequestCount(self.requests));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(self.concurrency));
        }
        Ok(())
    }

    /// Number of workers that receive no work at all
    pub fn idle_workers(&self) -> usize {
        self.concurrency.saturating_sub(self.requests)
    }
}
