//! Work partitioning
//!
//! Splits a total request count into per-worker quotas.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ConfigError;

/// How the remainder of an uneven split is distributed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionStrategy {
    /// Every worker gets the base quota, the last one also takes the remainder
    #[default]
    RemainderOnLast,
    /// The first `requests % workers` workers get one extra request each
    RoundRobin,
}

impl PartitionStrategy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "last" | "remainder-on-last" => Some(Self::RemainderOnLast),
            "round-robin" | "roundrobin" | "even" => Some(Self::RoundRobin),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RemainderOnLast => "remainder-on-last",
            Self::RoundRobin => "round-robin",
        }
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Split `requests` into `workers` quotas that sum to `requests`
pub fn partition(
    requests: usize,
    workers: usize,
    strategy: PartitionStrategy,
) -> Result<Vec<usize>, ConfigError> {
    if workers == 0 {
        return Err(ConfigError::InvalidConcurrency(workers));
    }

    let base = requests / workers;
    let remainder = requests % workers;
    let mut quotas = vec![base; workers];

    match strategy {
        PartitionStrategy::RemainderOnLast => quotas[workers - 1] += remainder,
        PartitionStrategy::RoundRobin => {
            for quota in quotas.iter_mut().take(remainder) {
                *quota += 1;
            }
        }
    }

    Ok(quotas)
}
