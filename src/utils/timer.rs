//! Run timing
//!
//! Measures the wall-clock duration of a run and the phases inside it.

use std::time::{Duration, Instant};
use tracing::debug;

/// Wall-clock timer with named phase marks
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    last: Instant,
    phases: Vec<(&'static str, Duration)>,
}

impl Timer {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            phases: Vec::new(),
        }
    }

    /// Close the current phase under `name` and return its duration
    pub fn mark(&mut self, name: &'static str) -> Duration {
        let now = Instant::now();
        let phase = now - self.last;
        self.last = now;
        self.phases.push((name, phase));
        phase
    }

    pub fn phases(&self) -> &[(&'static str, Duration)] {
        &self.phases
    }

    /// Total elapsed time since `start`, with the phase breakdown logged
    pub fn stop(self) -> Duration {
        let total = self.start.elapsed();
        for (name, phase) in self.phases() {
            debug!("{}: {}ms", name, phase.as_millis());
        }
        debug!("total: {}ms", total.as_millis());
        total
    }
}
