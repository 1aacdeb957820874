//! Sequential request worker

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::http::Transport;
use crate::models::Outcome;
use crate::progress::ProgressObserver;

/// Executes one worker's quota, one request at a time
pub struct Worker {
    id: usize,
    quota: usize,
    target: Arc<str>,
    transport: Arc<dyn Transport>,
    progress: Arc<dyn ProgressObserver>,
    sink: mpsc::Sender<Outcome>,
}

impl Worker {
    pub fn new(
        id: usize,
        quota: usize,
        target: Arc<str>,
        transport: Arc<dyn Transport>,
        progress: Arc<dyn ProgressObserver>,
        sink: mpsc::Sender<Outcome>,
    ) -> Self {
        Self {
            id,
            quota,
            target,
            transport,
            progress,
            sink,
        }
    }

    /// Run the whole quota and return the number of forwarded outcomes.
    ///
    /// Transport errors are forwarded like any other outcome; the loop only
    /// ends early if the collector has gone away.
    pub async fn run(self) -> usize {
        debug!("Worker #{} starting with quota {}", self.id, self.quota);

        let mut forwarded = 0;
        for _ in 0..self.quota {
            let outcome = self.transport.get(&self.target).await;
            if let Some(error) = outcome.transport_error() {
                debug!("Worker #{}: {}", self.id, error);
            }

            if self.sink.send(outcome).await.is_err() {
                warn!("Worker #{}: result collector closed, stopping", self.id);
                break;
            }
            forwarded += 1;
            self.progress.increment_worker(self.id);
        }

        debug!("Worker #{} finished ({} requests)", self.id, forwarded);
        forwarded
    }
}
