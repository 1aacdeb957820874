//! Recording transport double for engine tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::Transport;
use crate::models::Outcome;

/// Replays a fixed cycle of outcomes and records call metadata
pub struct MockTransport {
    script: Vec<Outcome>,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    targets: Mutex<HashSet<String>>,
}

impl MockTransport {
    pub fn new(script: Vec<Outcome>) -> Self {
        assert!(!script.is_empty(), "mock transport needs at least one outcome");
        Self {
            script,
            latency: Duration::from_millis(10),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            targets: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn distinct_targets(&self) -> usize {
        self.targets.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, target: &str) -> Outcome {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().insert(target.to_string());

        let active = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);

        tokio::time::sleep(self.latency).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.script[index % self.script.len()].clone()
    }
}
