//! Real-time deadline monitoring
//!
//! The acquisition device delivers one frame at a fixed rate, so every frame
//! has a processing budget. [`DeadlineMonitor`] receives one measurement per
//! frame, warns when the budget is exceeded and keeps the running totals used
//! for the end-of-run summary. It only observes: it never alters or aborts
//! processing.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{trace, warn};

/// Default per-frame budget in microseconds
pub const DEFAULT_BUDGET_US: u64 = 1000;

/// Aggregated timing of a filtering run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    pub frames: u64,
    pub channels: usize,
    pub budget_us: f64,
    pub total_us: f64,
    pub avg_frame_us: f64,
    pub avg_sample_us: f64,
    pub max_frame_us: f64,
    /// Index of the slowest frame, if any frame was recorded
    pub max_frame_index: Option<u64>,
    pub violations: u64,
}

/// Per-frame deadline bookkeeping
#[derive(Debug, Clone)]
pub struct DeadlineMonitor {
    budget: Duration,
    channels: usize,
    total: Duration,
    frames: u64,
    violations: u64,
    max: Duration,
    max_index: Option<u64>,
}

impl DeadlineMonitor {
    /// Create a monitor for frames of `channels` samples
    pub fn new(budget: Duration, channels: usize) -> Self {
        Self {
            budget,
            channels,
            total: Duration::ZERO,
            frames: 0,
            violations: 0,
            max: Duration::ZERO,
            max_index: None,
        }
    }

    pub fn with_budget_us(budget_us: u64, channels: usize) -> Self {
        Self::new(Duration::from_micros(budget_us), channels)
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Record the processing time of one frame.
    ///
    /// Returns `true` when the frame exceeded the budget.
    pub fn record(&mut self, frame_index: u64, elapsed: Duration) -> bool {
        self.total += elapsed;
        self.frames += 1;

        if self.max_index.is_none() || elapsed > self.max {
            self.max = elapsed;
            self.max_index = Some(frame_index);
        }

        let elapsed_us = as_micros(elapsed);
        trace!(frame = frame_index, elapsed_us, "Frame processed");

        let late = elapsed > self.budget;
        if late {
            self.violations += 1;
            warn!(
                frame = frame_index,
                elapsed_us,
                budget_us = as_micros(self.budget),
                "Frame {} took {:.2} us, exceeding real-time limit",
                frame_index,
                elapsed_us
            );
        }

        late
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn violations(&self) -> u64 {
        self.violations
    }

    /// Summarize everything recorded so far.
    ///
    /// Averages are 0.0 when no frame was recorded.
    pub fn stats(&self) -> TimingStats {
        let total_us = as_micros(self.total);
        let avg_frame_us = if self.frames == 0 {
            0.0
        } else {
            total_us / self.frames as f64
        };
        let avg_sample_us = if self.channels == 0 {
            0.0
        } else {
            avg_frame_us / self.channels as f64
        };

        TimingStats {
            frames: self.frames,
            channels: self.channels,
            budget_us: as_micros(self.budget),
            total_us,
            avg_frame_us,
            avg_sample_us,
            max_frame_us: as_micros(self.max),
            max_frame_index: self.max_index,
            violations: self.violations,
        }
    }
}

fn as_micros(d: Duration) -> f64 {
    d.as_secs_f64() * 1e6
}
