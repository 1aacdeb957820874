//! Progress reporting
//!
//! The engine ticks a `ProgressObserver` once per completed request. The
//! observer never influences the run itself.

mod tracker;

pub use tracker::ProgressTracker;

/// Receives per-worker completion ticks.
///
/// `increment_worker` is called concurrently from every worker, so
/// implementations must be internally synchronised. `stop` must be
/// idempotent.
pub trait ProgressObserver: Send + Sync {
    fn start(&self);
    fn stop(&self);
    fn increment_worker(&self, worker_id: usize);
}

/// Observer that ignores everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn start(&self) {}
    fn stop(&self) {}
    fn increment_worker(&self, _worker_id: usize) {}
}

/// Stops the wrapped observer when dropped
pub struct ProgressGuard<'a> {
    observer: &'a dyn ProgressObserver,
}

impl<'a> ProgressGuard<'a> {
    /// Start the observer and stop it again on drop
    pub fn start(observer: &'a dyn ProgressObserver) -> Self {
        observer.start();
        Self { observer }
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.observer.stop();
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::ProgressObserver;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Counts lifecycle calls and ticks per worker
    #[derive(Default)]
    pub struct RecordingProgress {
        pub starts: AtomicUsize,
        pub stops: AtomicUsize,
        ticks: Mutex<Vec<usize>>,
    }

    impl RecordingProgress {
        pub fn ticks_for(&self, worker_id: usize) -> usize {
            self.ticks
                .lock()
                .unwrap()
                .iter()
                .filter(|id| **id == worker_id)
                .count()
        }

        pub fn total_ticks(&self) -> usize {
            self.ticks.lock().unwrap().len()
        }
    }

    impl ProgressObserver for RecordingProgress {
        fn start(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn increment_worker(&self, worker_id: usize) {
            self.ticks.lock().unwrap().push(worker_id);
        }
    }
}
