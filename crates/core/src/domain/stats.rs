//! Signal statistics for comparing raw and filtered recordings

use crate::domain::frame::RawSample;
use serde::{Deserialize, Serialize};

/// Running statistics over every sample of a frame stream
///
/// Accumulates in `f64` so that squares of 16-bit samples cannot overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub frames: u64,
    pub samples: u64,
    pub min: Option<RawSample>,
    pub max: Option<RawSample>,
    sum: f64,
    sum_sq: f64,
}

impl SignalStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame into the statistics
    pub fn push_frame(&mut self, frame: &[RawSample]) {
        self.frames += 1;

        for &sample in frame {
            let value = f64::from(sample);
            self.samples += 1;
            self.sum += value;
            self.sum_sq += value * value;
            self.min = Some(self.min.map_or(sample, |m| m.min(sample)));
            self.max = Some(self.max.map_or(sample, |m| m.max(sample)));
        }
    }

    pub fn mean(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.sum / self.samples as f64
    }

    pub fn rms(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        (self.sum_sq / self.samples as f64).sqrt()
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_sq / self.samples as f64 - mean * mean).max(0.0).sqrt()
    }
}

/// Raw-versus-filtered comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamComparison {
    pub input: SignalStats,
    pub output: SignalStats,
}

impl StreamComparison {
    pub fn new(input: SignalStats, output: SignalStats) -> Self {
        Self { input, output }
    }

    /// Output RMS over input RMS, `None` for a silent input
    pub fn rms_ratio(&self) -> Option<f64> {
        let input = self.input.rms();
        (input > 0.0).then(|| self.output.rms() / input)
    }

    /// Signal level change in dB
    pub fn level_change_db(&self) -> Option<f64> {
        self.rms_ratio()
            .filter(|&ratio| ratio > 0.0)
            .map(|ratio| 20.0 * ratio.log10())
    }

    pub fn mean_change(&self) -> f64 {
        self.output.mean() - self.input.mean()
    }

    /// Relative change of the standard deviation in percent
    pub fn std_change_pct(&self) -> Option<f64> {
        let input = self.input.std_dev();
        (input > 0.0).then(|| (self.output.std_dev() - input) / input * 100.0)
    }
}
