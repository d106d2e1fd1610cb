//! Domain entities and numeric rules

pub mod config;
pub mod deadline;
pub mod dsp;
pub mod frame;
pub mod response;
pub mod stats;

// Re-export specific items to avoid ambiguous glob imports
pub use config::{ConfigError, PipelineConfig};
pub use deadline::{DeadlineMonitor, TimingStats, DEFAULT_BUDGET_US};
pub use dsp::{BiquadCoeffs, BiquadEngine, FilterBank, FilterState};
pub use frame::{
    decode_sample, encode_sample, frame_bytes, RawSample, NUM_CHANNELS, SAMPLE_BYTES,
};
pub use response::{ResponsePoint, ResponseSummary, ResponseSweep};
pub use stats::{SignalStats, StreamComparison};
