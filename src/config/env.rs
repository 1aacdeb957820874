//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

use super::AppConfig;
use crate::executor::PartitionStrategy;
use crate::target::StatusWeights;

/// Environment variable prefix
const ENV_PREFIX: &str = "STRESS_TEST";

/// Configuration read from environment variables
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvConfig {
    /// Target URL from STRESS_TEST_URL
    pub url: Option<String>,
    /// Request count from STRESS_TEST_REQUESTS
    pub requests: Option<usize>,
    /// Concurrency from STRESS_TEST_CONCURRENCY
    pub concurrency: Option<usize>,
    /// Timeout from STRESS_TEST_TIMEOUT
    pub timeout: Option<u64>,
    /// Output format from STRESS_TEST_FORMAT
    pub format: Option<String>,
    /// Partition strategy from STRESS_TEST_PARTITION
    pub partition: Option<PartitionStrategy>,
    /// Config file from STRESS_TEST_CONFIG
    pub config_file: Option<String>,
    /// Target server port from PORT
    pub port: Option<u16>,
    /// Target status weights from STATUS_WEIGHTS
    pub status_weights: Option<String>,
}

impl EnvConfig {
    /// Load configuration from the process environment
    pub fn load() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefixed = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));

        Self {
            url: prefixed("URL"),
            requests: prefixed("REQUESTS").and_then(|v| v.parse().ok()),
            concurrency: prefixed("CONCURRENCY").and_then(|v| v.parse().ok()),
            timeout: prefixed("TIMEOUT").and_then(|v| v.parse().ok()),
            format: prefixed("FORMAT"),
            partition: prefixed("PARTITION").and_then(|v| PartitionStrategy::from_str(&v)),
            config_file: prefixed("CONFIG"),
            port: lookup("PORT").and_then(|v| v.parse().ok()),
            status_weights: lookup("STATUS_WEIGHTS"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self != &Self::default()
    }

    /// Overlay the set values onto an application config
    pub fn apply(&self, config: &mut AppConfig) -> anyhow::Result<()> {
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            config.default_concurrency = concurrency;
        }
        if let Some(format) = &self.format {
            config.format = format.clone();
        }
        if let Some(partition) = self.partition {
            config.partition = partition;
        }
        if let Some(port) = self.port {
            config.target.port = port;
        }
        if let Some(weights) = &self.status_weights {
            config.target.status_weights = StatusWeights::parse(weights)?;
        }
        Ok(())
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        if !self.has_any() {
            println!("  (no variables set)");
            return;
        }
        println!("  {}_URL:          {:?}", ENV_PREFIX, self.url);
        println!("  {}_REQUESTS:     {:?}", ENV_PREFIX, self.requests);
        println!("  {}_CONCURRENCY:  {:?}", ENV_PREFIX, self.concurrency);
        println!("  {}_TIMEOUT:      {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_FORMAT:       {:?}", ENV_PREFIX, self.format);
        println!("  {}_PARTITION:    {:?}", ENV_PREFIX, self.partition);
        println!("  {}_CONFIG:       {:?}", ENV_PREFIX, self.config_file);
        println!("  PORT:                     {:?}", self.port);
        println!("  STATUS_WEIGHTS:           {:?}", self.status_weights);
    }
}

/// Print all supported environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_URL          Target URL");
    println!("  {ENV_PREFIX}_REQUESTS     Total number of requests");
    println!("  {ENV_PREFIX}_CONCURRENCY  Number of concurrent workers");
    println!("  {ENV_PREFIX}_TIMEOUT      Request timeout in seconds");
    println!("  {ENV_PREFIX}_FORMAT       Output format (table, json, json-pretty, summary)");
    println!("  {ENV_PREFIX}_PARTITION    Partition strategy (last, round-robin)");
    println!("  {ENV_PREFIX}_CONFIG       Path to configuration file");
    println!("  PORT                     Target server port");
    println!("  STATUS_WEIGHTS           Target status weights (e.g. 200:60,500:40)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_URL=http://localhost:8080");
    println!("  export {ENV_PREFIX}_REQUESTS=1000");
    println!("  stress-test run --concurrency 10");
}
