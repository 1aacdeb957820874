//! Terminal progress bars built on indicatif

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};

use super::ProgressObserver;

const TOTAL_TEMPLATE: &str =
    "{msg:<14} [{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} ({percent:>3}%)";
const WORKER_TEMPLATE: &str = "{msg:<14} [{bar:40.cyan/blue}] {pos}/{len}";

/// One total bar plus one bar per worker
pub struct ProgressTracker {
    multi: MultiProgress,
    total: ProgressBar,
    workers: Vec<ProgressBar>,
    started: AtomicBool,
    stopped: AtomicBool,
}

impl ProgressTracker {
    /// Build bars for the given per-worker quotas
    pub fn new(quotas: &[usize]) -> Self {
        // Nothing is drawn until start()
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());

        let total_requests: usize = quotas.iter().sum();
        let total = multi.add(ProgressBar::new(total_requests as u64));
        total.set_style(style(TOTAL_TEMPLATE));
        total.set_message("Total Progress");

        let workers = quotas
            .iter()
            .enumerate()
            .map(|(id, quota)| {
                let bar = multi.add(ProgressBar::new(*quota as u64));
                bar.set_style(style(WORKER_TEMPLATE));
                bar.set_message(format!("Worker #{}", id + 1));
                bar
            })
            .collect();

        Self {
            multi,
            total,
            workers,
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }
}

#[cfg(test)]
impl ProgressTracker {
    fn position(&self) -> u64 {
        self.total.position()
    }

    fn worker_position(&self, worker_id: usize) -> Option<u64> {
        self.workers.get(worker_id).map(|bar| bar.position())
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
}

impl ProgressObserver for ProgressTracker {
    fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        self.multi.set_draw_target(ProgressDrawTarget::stderr());
    }

    fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        for bar in &self.workers {
            bar.finish();
        }
        self.total.finish();
    }

    fn increment_worker(&self, worker_id: usize) {
        if let Some(bar) = self.workers.get(worker_id) {
            bar.inc(1);
            self.total.inc(1);
        }
    }
}
