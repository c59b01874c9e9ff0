//! Elapsed-time reporting for long steps.

use std::time::{Duration, Instant};

use tracing::info;

/// Logs how long a step took when dropped, on every exit path.
#[derive(Debug)]
pub struct Stopwatch {
    label: String,
    started: Instant,
}

impl Stopwatch {
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        info!("done ({}) in {:.2}s", self.label, self.elapsed().as_secs_f64());
    }
}
