//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{AppConfig, EnvConfig, TargetConfig};
use crate::models::TestConfig;
use crate::target::StatusWeights;
use crate::utils::LogLevel;

/// HTTP load generator with a fixed worker pool
#[derive(Parser, Debug)]
#[command(name = "stress-test")]
#[command(version = "0.1.0")]
#[command(about = "Fire a fixed number of GET requests at a target and report the results")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a load test against a target URL
    Run(RunArgs),

    /// Start the synthetic target server
    Serve(ServeArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Target URL
    #[arg(short, long)]
    pub url: Option<String>,

    /// Total number of requests
    #[arg(short, long)]
    pub requests: Option<usize>,

    /// Number of concurrent workers
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Output format (table, json, json-pretty, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// How uneven request counts are split (last, round-robin)
    #[arg(short, long)]
    pub partition: Option<String>,

    /// Pause after the run before reporting, in milliseconds
    #[arg(long)]
    pub grace_ms: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Save report to file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<String>,
}

impl RunArgs {
    /// Build the run configuration. Flags win over environment variables,
    /// which win over the config file.
    pub fn test_config(&self, env: &EnvConfig, app: &AppConfig) -> Result<TestConfig> {
        let url = self
            .url
            .clone()
            .or_else(|| env.url.clone())
            .context("Target URL is required (--url or STRESS_TEST_URL)")?;
        let requests = self
            .requests
            .or(env.requests)
            .context("Request count is required (--requests or STRESS_TEST_REQUESTS)")?;
        let concurrency = self
            .concurrency
            .or(env.concurrency)
            .unwrap_or(app.default_concurrency);

        Ok(TestConfig::new(url, requests, concurrency)?)
    }
}

/// Arguments for serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Status weights, e.g. "200:60,500:40"
    #[arg(short, long)]
    pub weights: Option<String>,

    /// Minimum response delay in milliseconds
    #[arg(long)]
    pub min_delay_ms: Option<u64>,

    /// Maximum response delay in milliseconds
    #[arg(long)]
    pub max_delay_ms: Option<u64>,

    /// Arm the idle watchdog after this many requests
    #[arg(long)]
    pub shutdown_after: Option<u64>,

    /// Idle seconds before the armed watchdog stops the server
    #[arg(long)]
    pub idle_timeout: Option<u64>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<String>,
}

impl ServeArgs {
    /// Overlay the flags onto a target configuration
    pub fn apply(&self, target: &mut TargetConfig) -> Result<()> {
        if let Some(port) = self.port {
            target.port = port;
        }
        if let Some(weights) = &self.weights {
            target.status_weights = StatusWeights::parse(weights)?;
        }
        if let Some(min) = self.min_delay_ms {
            target.min_delay_ms = min;
        }
        if let Some(max) = self.max_delay_ms {
            target.max_delay_ms = max;
        }
        if let Some(threshold) = self.shutdown_after {
            target.shutdown_after_requests = threshold;
        }
        if let Some(idle) = self.idle_timeout {
            target.idle_timeout_secs = idle;
        }
        target.validate()
    }
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./stress-test.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Show environment variables instead
        #[arg(short, long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the discovered file)
        file: Option<String>,
    },

    /// List supported environment variables
    Env,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfigError;

    #[test]
    fn test_run_args() {
        let args = Args::parse_from([
            "stress-test",
            "run",
            "--url",
            "http://localhost:8080",
            "--requests",
            "100",
            "-c",
            "10",
            "--partition",
            "round-robin",
            "--no-progress",
        ]);
        match args.command {
            Command::Run(run) => {
                assert_eq!(run.url.as_deref(), Some("http://localhost:8080"));
                assert_eq!(run.requests, Some(100));
                assert_eq!(run.concurrency, Some(10));
                assert_eq!(run.partition.as_deref(), Some("round-robin"));
                assert!(run.no_progress);
                assert!(!run.no_color);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = Args::parse_from([
            "stress-test",
            "serve",
            "--port",
            "9000",
            "--log-level",
            "warn",
        ]);
        assert!(!args.verbose);
        assert_eq!(args.log_level, Some(LogLevel::Warn));
        match args.command {
            Command::Serve(serve) => assert_eq!(serve.port, Some(9000)),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_non_numeric_requests_rejected() {
        let result = Args::try_parse_from(["stress-test", "run", "--requests", "many"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_defaults_concurrency() {
        let args = Args::parse_from(["stress-test", "run", "-u", "http://x", "-r", "5"]);
        let Command::Run(run) = args.command else {
            panic!("Expected Run command");
        };
        let config = run
            .test_config(&EnvConfig::default(), &AppConfig::default())
            .unwrap();
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.requests, 5);
    }

    #[test]
    fn test_env_fills_missing_flags() {
        let args = Args::parse_from(["stress-test", "run", "--requests", "20"]);
        let Command::Run(run) = args.command else {
            panic!("Expected Run command");
        };
        let env = EnvConfig {
            url: Some("http://from-env".to_string()),
            requests: Some(999),
            concurrency: Some(4),
            ..EnvConfig::default()
        };
        let config = run.test_config(&env, &AppConfig::default()).unwrap();
        assert_eq!(config.url, "http://from-env");
        assert_eq!(config.requests, 20);
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_missing_url_rejected() {
        let args = Args::parse_from(["stress-test", "run", "--requests", "20"]);
        let Command::Run(run) = args.command else {
            panic!("Expected Run command");
        };
        assert!(run
            .test_config(&EnvConfig::default(), &AppConfig::default())
            .is_err());
    }

    #[test]
    fn test_zero_requests_rejected() {
        let args = Args::parse_from(["stress-test", "run", "-u", "http://x", "-r", "0"]);
        let Command::Run(run) = args.command else {
            panic!("Expected Run command");
        };
        let err = run
            .test_config(&EnvConfig::default(), &AppConfig::default())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::InvalidRequestCount(0))
        );
    }

    #[test]
    fn test_serve_args_apply() {
        let args = Args::parse_from([
            "stress-test",
            "serve",
            "--weights",
            "200:1",
            "--min-delay-ms",
            "0",
            "--max-delay-ms",
            "10",
        ]);
        let Command::Serve(serve) = args.command else {
            panic!("Expected Serve command");
        };
        let mut target = TargetConfig::default();
        serve.apply(&mut target).unwrap();
        assert_eq!(target.max_delay_ms, 10);
        assert_eq!(target.status_weights.total_weight(), 1);
        assert_eq!(target.port, 8080);
    }
}
