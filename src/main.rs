//! stress-test - HTTP load generator
//!
//! Fires a fixed number of GET requests at a target through a fixed pool of
//! concurrent workers, then prints a statistical report.
//!
//! ## Usage
//!
//! ```bash
//! # 1000 requests over 10 workers
//! stress-test run --url http://localhost:8080 --requests 1000 --concurrency 10
//!
//! # Machine-readable output
//! stress-test run -u http://localhost:8080 -r 100 --format json --no-progress
//!
//! # Synthetic target with custom status weights
//! stress-test serve --port 8080 --weights "200:80,500:20"
//!
//! # Write an example configuration file
//! stress-test config init
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

mod cli;
mod config;
mod executor;
mod http;
mod models;
mod output;
mod progress;
mod target;
mod utils;

use cli::Args;
use config::{AppConfig, ConfigFile, EnvConfig};
use executor::{partition, LoadTester, PartitionStrategy};
use http::HttpClient;
use output::{OutputFormat, ResultFormatter};
use progress::{NoopProgress, ProgressObserver, ProgressTracker};
use target::TargetServer;
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(LogLevel::resolve(args.verbose, args.log_level));

    match args.command {
        cli::Command::Run(run_args) => run_load_test(run_args).await?,
        cli::Command::Serve(serve_args) => serve_target(serve_args).await?,
        cli::Command::Config(config_args) => manage_config(config_args)?,
    }

    Ok(())
}

/// Load the config file named by the flag, the environment, or the standard
/// locations, then overlay environment variables
fn load_app_config(flag: Option<&str>, env: &EnvConfig) -> Result<AppConfig> {
    let file = match flag.or(env.config_file.as_deref()) {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };

    let mut app = file.app;
    env.apply(&mut app)?;
    app.validate()?;
    Ok(app)
}

async fn run_load_test(args: cli::RunArgs) -> Result<()> {
    let env = EnvConfig::load();
    let app = load_app_config(args.config.as_deref(), &env)?;

    // Everything is validated before any request goes out
    let test_config = args.test_config(&env, &app)?;

    let format_name = args.format.as_deref().unwrap_or(&app.format);
    let format = OutputFormat::from_str(format_name)
        .with_context(|| format!("Unknown output format: {format_name}"))?;

    let strategy = match args.partition.as_deref() {
        Some(name) => PartitionStrategy::from_str(name)
            .with_context(|| format!("Unknown partition strategy: {name}"))?,
        None => app.partition,
    };

    let timeout = args.timeout.unwrap_or(app.timeout_secs);
    let grace = Duration::from_millis(args.grace_ms.unwrap_or(app.grace_period_ms));

    let progress: Arc<dyn ProgressObserver> = if app.progress && !args.no_progress {
        let quotas = partition(test_config.requests, test_config.concurrency, strategy)?;
        Arc::new(ProgressTracker::new(&quotas))
    } else {
        Arc::new(NoopProgress)
    };

    let client = HttpClient::with_timeout(timeout)?;
    debug!("Request timeout: {}s", client.timeout().as_secs());
    let tester = LoadTester::new(Arc::new(client))
        .with_progress(progress)
        .with_strategy(strategy)
        .with_grace_period(grace);

    let report = tester.execute(&test_config).await?;

    let mut formatter = ResultFormatter::new(format);
    if args.no_color || !app.color {
        formatter = formatter.no_color();
    }
    println!("{}", formatter.format_report(&report));

    if let Some(path) = &args.output {
        output::write_report_to_file(path, &report, format)
            .with_context(|| format!("Failed to write report to {path}"))?;
        info!("Report saved to {}", path);
    }

    Ok(())
}

async fn serve_target(args: cli::ServeArgs) -> Result<()> {
    let env = EnvConfig::load();
    let app = load_app_config(args.config.as_deref(), &env)?;

    let mut target_config = app.target;
    args.apply(&mut target_config)?;

    let weights = &target_config.status_weights;
    info!(
        "Status weights: {} ({} codes, total {})",
        weights,
        weights.entries().len(),
        weights.total_weight()
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], target_config.port));
    let server = TargetServer::bind(&target_config, addr).await?;

    server
        .run(async {
            // If the handler cannot be installed only the watchdog stops the server
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await
}

fn manage_config(args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            ConfigFile::example().save(path)?;
            println!("✓ Configuration file created: {output}");
        }

        cli::ConfigAction::Show { env, format } => {
            let env_config = EnvConfig::load();
            if env {
                env_config.print_summary();
            } else {
                let app = load_app_config(None, &env_config)?;
                let effective = ConfigFile {
                    app,
                    ..ConfigFile::default()
                };
                let output = if format == "json" {
                    serde_json::to_string_pretty(&effective)?
                } else {
                    serde_yaml::to_string(&effective)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Validate { file } => {
            let path = file
                .or_else(|| ConfigFile::find().map(|p| p.to_string_lossy().to_string()))
                .unwrap_or_else(|| "./stress-test.yaml".to_string());

            match ConfigFile::load(&path) {
                Ok(_) => println!("✓ Configuration file is valid: {path}"),
                Err(e) => {
                    println!("✗ Configuration file is invalid: {path}");
                    println!("  Error: {e}");
                    return Err(e);
                }
            }
        }

        cli::ConfigAction::Env => config::env::print_env_help(),
    }

    Ok(())
}
