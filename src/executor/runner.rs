//! Load test orchestration
//!
//! Drives one run from `TestConfig` to `TestReport`: partitions the work,
//! spawns the workers, streams their outcomes into a buffer and aggregates
//! once every worker has returned.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::aggregate::aggregate;
use super::partition::{partition, PartitionStrategy};
use super::worker::Worker;
use crate::http::Transport;
use crate::models::{ConfigError, Outcome, TestConfig, TestReport};
use crate::progress::{NoopProgress, ProgressGuard, ProgressObserver};
use crate::utils::Timer;

/// Pause after the last worker returns so progress rendering can settle
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Fixed-pool load tester
pub struct LoadTester {
    transport: Arc<dyn Transport>,
    progress: Arc<dyn ProgressObserver>,
    strategy: PartitionStrategy,
    grace_period: Duration,
}

impl LoadTester {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            progress: Arc::new(NoopProgress),
            strategy: PartitionStrategy::default(),
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_strategy(mut self, strategy: PartitionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Run the load test to completion.
    ///
    /// Fails only on an invalid configuration; transport errors end up in
    /// the report.
    pub async fn execute(&self, config: &TestConfig) -> Result<TestReport, ConfigError> {
        config.validate()?;
        let quotas = partition(config.requests, config.concurrency, self.strategy)?;

        info!(
            "Starting load test: {} requests against {} with {} workers",
            config.requests, config.url, config.concurrency
        );
        debug!("Worker quotas ({}): {:?}", self.strategy, quotas);
        if config.idle_workers() > 0 {
            debug!("{} workers have no requests assigned", config.idle_workers());
        }

        let mut timer = Timer::start();
        let _progress = ProgressGuard::start(self.progress.as_ref());

        let outcomes = self.dispatch(config, &quotas).await;
        timer.mark("dispatch");

        if outcomes.len() != config.requests {
            warn!(
                "Collected {} of {} outcomes",
                outcomes.len(),
                config.requests
            );
        }

        if !self.grace_period.is_zero() {
            tokio::time::sleep(self.grace_period).await;
            timer.mark("grace");
        }

        let report = aggregate(&outcomes, timer.stop());

        info!(
            "Load test completed in {}ms - {}/{} succeeded ({:.1}%), {} errors",
            report.total_duration.as_millis(),
            report.success_requests,
            report.total_requests,
            report.success_rate(),
            report.error_count
        );

        Ok(report)
    }

    /// Spawn one worker per quota and collect their outcomes as they arrive
    async fn dispatch(&self, config: &TestConfig, quotas: &[usize]) -> Vec<Outcome> {
        // Room for every outcome, so a producer never waits on the collector
        let (tx, mut rx) = mpsc::channel(config.requests.max(1));
        let target: Arc<str> = Arc::from(config.url.as_str());

        let handles: Vec<_> = quotas
            .iter()
            .enumerate()
            .map(|(id, &quota)| {
                let worker = Worker::new(
                    id,
                    quota,
                    target.clone(),
                    self.transport.clone(),
                    self.progress.clone(),
                    tx.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        // Only the workers hold senders now; the channel closes when the
        // last one returns
        drop(tx);

        let mut outcomes = Vec::with_capacity(config.requests);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }

        for (id, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok(forwarded) => debug!("Worker #{} joined after {} requests", id, forwarded),
                Err(e) => warn!("Worker #{} did not complete: {}", id, e),
            }
        }

        outcomes
    }
}
