//! Frequency response analysis of a biquad coefficient set
//!
//! Evaluates `H(e^jw) = (b0 + b1 e^-jw + b2 e^-2jw) / (1 + a1 e^-jw + a2 e^-2jw)`
//! in `f64` and derives magnitude, phase and group delay from it. Used to
//! check what the fixed notch actually does at a given acquisition rate.

use crate::domain::dsp::BiquadCoeffs;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Attenuation that bounds the passband
pub const PASSBAND_EDGE_DB: f64 = -3.0;

/// Default number of frequency points in a sweep
pub const DEFAULT_POINTS: usize = 512;

// Below this magnitude a polynomial is treated as singular for group delay
const SINGULAR_EPSILON: f64 = 1e-12;

/// Response of the filter at one frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponsePoint {
    pub freq_hz: f64,
    pub magnitude_db: f64,
    pub phase_deg: f64,
    pub group_delay_samples: f64,
}

impl BiquadCoeffs {
    fn numerator(&self) -> [f64; 3] {
        [f64::from(self.b0), f64::from(self.b1), f64::from(self.b2)]
    }

    fn denominator(&self) -> [f64; 3] {
        [1.0, f64::from(self.a1), f64::from(self.a2)]
    }

    /// Complex response at `freq_hz` for a stream sampled at `sample_rate_hz`
    pub fn response(&self, freq_hz: f64, sample_rate_hz: f64) -> Complex64 {
        let w = 2.0 * PI * freq_hz / sample_rate_hz;
        eval_poly(&self.numerator(), w) / eval_poly(&self.denominator(), w)
    }

    /// Magnitude in decibels at `freq_hz`
    pub fn magnitude_db(&self, freq_hz: f64, sample_rate_hz: f64) -> f64 {
        20.0 * self.response(freq_hz, sample_rate_hz).norm().log10()
    }

    /// Group delay in samples at `freq_hz`
    ///
    /// Returns 0.0 where numerator or denominator vanishes, e.g. exactly on a
    /// notch zero.
    pub fn group_delay(&self, freq_hz: f64, sample_rate_hz: f64) -> f64 {
        let w = 2.0 * PI * freq_hz / sample_rate_hz;
        match (
            poly_group_delay(&self.numerator(), w),
            poly_group_delay(&self.denominator(), w),
        ) {
            (Some(num), Some(den)) => num - den,
            _ => 0.0,
        }
    }

    /// Evaluate the response at `points` frequencies evenly spaced over
    /// `[0, sample_rate_hz / 2)`.
    pub fn sweep(&self, sample_rate_hz: f64, points: usize) -> ResponseSweep {
        let nyquist = sample_rate_hz / 2.0;
        let points = (0..points)
            .map(|i| {
                let freq_hz = nyquist * i as f64 / points as f64;
                let h = self.response(freq_hz, sample_rate_hz);
                ResponsePoint {
                    freq_hz,
                    magnitude_db: 20.0 * h.norm().log10(),
                    phase_deg: h.arg().to_degrees(),
                    group_delay_samples: self.group_delay(freq_hz, sample_rate_hz),
                }
            })
            .collect();

        ResponseSweep {
            sample_rate_hz,
            points,
        }
    }
}

// sum(c[k] * e^{-jkw})
fn eval_poly(coeffs: &[f64; 3], w: f64) -> Complex64 {
    coeffs
        .iter()
        .enumerate()
        .map(|(k, &c)| c * Complex64::from_polar(1.0, -(k as f64) * w))
        .sum()
}

// Re(sum(k c[k] e^{-jkw}) / sum(c[k] e^{-jkw}))
fn poly_group_delay(coeffs: &[f64; 3], w: f64) -> Option<f64> {
    let value = eval_poly(coeffs, w);
    if value.norm() < SINGULAR_EPSILON {
        return None;
    }

    let ramp: Complex64 = coeffs
        .iter()
        .enumerate()
        .map(|(k, &c)| k as f64 * c * Complex64::from_polar(1.0, -(k as f64) * w))
        .sum();

    Some((ramp / value).re)
}

/// Minimum, mean and maximum of a set of group delays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayStats {
    pub min_samples: f64,
    pub mean_samples: f64,
    pub max_samples: f64,
}

impl DelayStats {
    fn from_delays(delays: impl Iterator<Item = f64>) -> Option<Self> {
        let mut count = 0_usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for d in delays {
            count += 1;
            sum += d;
            min = min.min(d);
            max = max.max(d);
        }

        (count > 0).then(|| Self {
            min_samples: min,
            mean_samples: sum / count as f64,
            max_samples: max,
        })
    }

    /// Convert a delay in samples to microseconds
    pub fn to_micros(samples: f64, sample_rate_hz: f64) -> f64 {
        samples * 1e6 / sample_rate_hz
    }
}

/// Band in which the magnitude is at or below [`PASSBAND_EDGE_DB`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopBand {
    pub lower_hz: f64,
    pub upper_hz: f64,
}

impl StopBand {
    pub fn width_hz(&self) -> f64 {
        self.upper_hz - self.lower_hz
    }
}

/// Digest of a [`ResponseSweep`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseSummary {
    pub sample_rate_hz: f64,
    pub points: usize,
    /// Group delay over every swept frequency
    pub group_delay: Option<DelayStats>,
    /// Group delay over frequencies attenuated by less than 3 dB
    pub passband_delay: Option<DelayStats>,
    pub stop_band: Option<StopBand>,
    /// Frequency of the deepest attenuation and its magnitude
    pub notch_hz: Option<f64>,
    pub notch_db: Option<f64>,
}

/// Response sampled over a frequency grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSweep {
    pub sample_rate_hz: f64,
    pub points: Vec<ResponsePoint>,
}

impl ResponseSweep {
    pub fn summary(&self) -> ResponseSummary {
        let group_delay =
            DelayStats::from_delays(self.points.iter().map(|p| p.group_delay_samples));
        let passband_delay = DelayStats::from_delays(
            self.points
                .iter()
                .filter(|p| p.magnitude_db > PASSBAND_EDGE_DB)
                .map(|p| p.group_delay_samples),
        );

        // First and last attenuated points bound the stop band
        let mut attenuated = self
            .points
            .iter()
            .filter(|p| p.magnitude_db <= PASSBAND_EDGE_DB);
        let stop_band = attenuated.next().map(|first| {
            let last = attenuated.last().unwrap_or(first);
            StopBand {
                lower_hz: first.freq_hz,
                upper_hz: last.freq_hz,
            }
        });

        let notch = self
            .points
            .iter()
            .filter(|p| !p.magnitude_db.is_nan())
            .min_by(|a, b| a.magnitude_db.total_cmp(&b.magnitude_db));

        ResponseSummary {
            sample_rate_hz: self.sample_rate_hz,
            points: self.points.len(),
            group_delay,
            passband_delay,
            stop_band,
            notch_hz: notch.map(|p| p.freq_hz),
            notch_db: notch.map(|p| p.magnitude_db),
        }
    }
}
