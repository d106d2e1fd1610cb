//! Per-channel recursive filtering
//!
//! This module provides:
//! - The fixed notch coefficient set used for neural recordings
//! - Per-channel filter memory ([`FilterState`])
//! - The biquad difference equation ([`BiquadEngine`])
//! - A bank of `N` independent channel filters driven one frame at a time
//!
//! All of it is designed for the per-frame hot path:
//! - Zero allocations after construction
//! - No failure modes (NaN/Inf propagate through the feedback path untouched)
//! - Bit-for-bit reproducible `f32` arithmetic

use crate::domain::frame::{decode_sample, encode_sample, RawSample, NUM_CHANNELS};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// COEFFICIENTS
// ============================================================================

/// Biquad filter coefficients
///
/// Normalized so that `a0 == 1.0`. Shared read-only by every channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiquadCoeffs {
    /// Numerator coefficients
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    /// Denominator coefficients (a0 is normalized to 1.0)
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoeffs {
    /// Narrow mains notch applied to every channel of the neural recordings.
    ///
    /// At the 32 kHz acquisition rate the zeros sit on the unit circle near
    /// 60 Hz; gain elsewhere, DC included, stays close to unity. See
    /// [`crate::domain::response`] for the measured shape.
    pub const NEURAL_NOTCH: Self = Self {
        b0: 0.999_019_21,
        b1: -1.997_900_74,
        b2: 0.999_019_21,
        a1: -1.997_900_74,
        a2: 0.998_038_43,
    };

    /// Coefficients that pass the input through unchanged
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        Self::NEURAL_NOTCH
    }
}

// ============================================================================
// FILTER STATE
// ============================================================================

/// Memory of one channel's filter: the two most recent inputs and outputs
///
/// `x_prev1`/`y_prev1` are the newest, `x_prev2`/`y_prev2` the ones before.
/// Only [`BiquadEngine::apply`] mutates it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    x_prev1: f32,
    x_prev2: f32,
    y_prev1: f32,
    y_prev2: f32,
}

impl FilterState {
    /// Previous inputs, newest first
    pub fn inputs(&self) -> (f32, f32) {
        (self.x_prev1, self.x_prev2)
    }

    /// Previous outputs, newest first
    pub fn outputs(&self) -> (f32, f32) {
        (self.y_prev1, self.y_prev2)
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Second-order recursive filter bound to one coefficient set
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BiquadEngine {
    coeffs: BiquadCoeffs,
}

impl BiquadEngine {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self { coeffs }
    }

    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    /// Filter one sample through `state`.
    ///
    /// The output is computed from the pre-update history, then both delay
    /// lines shift by one.
    #[inline]
    pub fn apply(&self, state: &mut FilterState, x: f32) -> f32 {
        // y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
        let c = &self.coeffs;
        let y = c.b0 * x + c.b1 * state.x_prev1 + c.b2 * state.x_prev2
            - c.a1 * state.y_prev1
            - c.a2 * state.y_prev2;

        state.x_prev2 = state.x_prev1;
        state.x_prev1 = x;
        state.y_prev2 = state.y_prev1;
        state.y_prev1 = y;

        y
    }
}

// ============================================================================
// FILTER BANK
// ============================================================================

/// `N` independent channel filters sharing one engine
///
/// States are zeroed at construction and live for a single filtering run.
/// Channel `i` of the input frame always maps to channel `i` of the output.
#[derive(Debug, Clone)]
pub struct FilterBank<const N: usize = NUM_CHANNELS> {
    engine: BiquadEngine,
    states: [FilterState; N],
    // Working (f32) representation of the frame in flight
    work: [f32; N],
}

impl<const N: usize> FilterBank<N> {
    /// Create a bank with all channel states zeroed
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        debug!(channels = N, ?coeffs, "Creating filter bank");

        Self {
            engine: BiquadEngine::new(coeffs),
            states: [FilterState::default(); N],
            work: [0.0; N],
        }
    }

    /// Number of channels in the bank
    pub const fn channels(&self) -> usize {
        N
    }

    pub fn engine(&self) -> &BiquadEngine {
        &self.engine
    }

    /// Current state of one channel, if it exists
    pub fn state(&self, channel: usize) -> Option<&FilterState> {
        self.states.get(channel)
    }

    /// Filter a single working sample on one channel.
    ///
    /// # Panics
    /// Panics if `channel >= N`.
    #[inline]
    pub fn filter_channel(&mut self, channel: usize, x: f32) -> f32 {
        self.engine.apply(&mut self.states[channel], x)
    }

    /// Decode, filter and encode one raw frame.
    pub fn process_frame(&mut self, input: &[RawSample; N], output: &mut [RawSample; N]) {
        for (slot, &raw) in self.work.iter_mut().zip(input.iter()) {
            *slot = decode_sample(raw);
        }

        let engine = &self.engine;
        for (state, slot) in self.states.iter_mut().zip(self.work.iter_mut()) {
            *slot = engine.apply(state, *slot);
        }

        for (out, &y) in output.iter_mut().zip(self.work.iter()) {
            *out = encode_sample(y);
        }
    }

    /// Zero every channel's history
    pub fn reset(&mut self) {
        self.states = [FilterState::default(); N];
        self.work = [0.0; N];
    }
}

impl<const N: usize> Default for FilterBank<N> {
    fn default() -> Self {
        Self::new(BiquadCoeffs::NEURAL_NOTCH)
    }
}
