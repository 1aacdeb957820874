//! Logging setup
//!
//! Logs go to stderr; stdout is reserved for the report.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Verbosity selected on the command line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `--verbose` always means debug, otherwise the requested level or info
    pub fn resolve(verbose: bool, requested: Option<LogLevel>) -> Self {
        if verbose {
            LogLevel::Debug
        } else {
            requested.unwrap_or_default()
        }
    }

    fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Filter used when `RUST_LOG` is not set. HTTP internals stay quiet even
/// at debug so per-request lines remain readable.
fn default_filter(level: LogLevel) -> String {
    format!("stress_test={},hyper=warn,reqwest=warn", level.directive())
}

/// Install the global subscriber. `RUST_LOG` takes precedence when set.
pub fn init_logger(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
