//! Configuration module
//!
//! Handles loading and managing configuration. Values are layered: CLI
//! flags over environment variables over the config file over defaults.

pub mod env;
mod file;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::executor::{PartitionStrategy, DEFAULT_GRACE_PERIOD};
use crate::http::DEFAULT_TIMEOUT_SECS;
use crate::target::StatusWeights;

pub use env::EnvConfig;
pub use file::ConfigFile;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Worker count when none is given on the command line
    pub default_concurrency: usize,

    /// Pause after the run before the report is printed, in milliseconds
    pub grace_period_ms: u64,

    /// Render progress bars while the run is in flight
    pub progress: bool,

    /// Colorize terminal output
    pub color: bool,

    /// Report format (table, json, json-pretty, summary)
    pub format: String,

    /// How uneven request counts are split across workers
    pub partition: PartitionStrategy,

    /// Synthetic target server settings
    pub target: TargetConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_concurrency: 1,
            grace_period_ms: DEFAULT_GRACE_PERIOD.as_millis() as u64,
            progress: true,
            color: true,
            format: "table".to_string(),
            partition: PartitionStrategy::default(),
            target: TargetConfig::default(),
        }
    }
}

impl AppConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if self.default_concurrency == 0 {
            anyhow::bail!("default_concurrency must be at least 1");
        }
        self.target.validate()
    }
}

/// Synthetic target server configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Listen port
    pub port: u16,

    /// Status codes and their relative weights
    pub status_weights: StatusWeights,

    /// Lower bound of the response delay (inclusive)
    pub min_delay_ms: u64,

    /// Upper bound of the response delay (exclusive)
    pub max_delay_ms: u64,

    /// Request count after which the idle watchdog is armed
    pub shutdown_after_requests: u64,

    /// Idle time before the armed watchdog stops the server
    pub idle_timeout_secs: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            status_weights: StatusWeights::default(),
            min_delay_ms: 100,
            max_delay_ms: 2000,
            shutdown_after_requests: 100,
            idle_timeout_secs: 5,
        }
    }
}

impl TargetConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_delay_ms > self.max_delay_ms {
            anyhow::bail!(
                "min_delay_ms ({}) must not exceed max_delay_ms ({})",
                self.min_delay_ms,
                self.max_delay_ms
            );
        }
        Ok(())
    }
}
