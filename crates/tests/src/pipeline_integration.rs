//! Integration tests for the streaming filter pipeline
//!
//! These tests drive complete runs through files and in-memory streams and
//! check the properties that must hold end to end: frame conservation,
//! determinism, channel independence and the notch response itself.

use neurofilt_core::domain::{BiquadCoeffs, PipelineConfig, NUM_CHANNELS};
use neurofilt_infra::stream::{compare_files, PipelineError, PipelineState, StreamingPipeline};
use proptest::prelude::*;
use std::io::Cursor;
use std::time::Duration;
use tempfile::TempDir;

const SAMPLE_RATE: f64 = 32_000.0;

fn to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
}

fn from_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|c| i16::from_ne_bytes([c[0], c[1]]))
        .collect()
}

/// Interleaved frames of a sine per channel, channel `c` shifted by `c` radians
fn sine_frames(channels: usize, frames: usize, freq_hz: f64, amplitude: f64) -> Vec<i16> {
    (0..frames)
        .flat_map(|i| {
            (0..channels).map(move |c| {
                let phase = 2.0 * std::f64::consts::PI * freq_hz * i as f64 / SAMPLE_RATE;
                (amplitude * (phase + c as f64).sin()) as i16
            })
        })
        .collect()
}

fn channel(samples: &[i16], channels: usize, index: usize) -> Vec<i16> {
    samples.iter().skip(index).step_by(channels).copied().collect()
}

fn rms(samples: &[i16]) -> f64 {
    let sum_sq: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

fn filter<const N: usize>(samples: &[i16]) -> Vec<i16> {
    let mut sink = Vec::new();
    let mut pipeline: StreamingPipeline<N> = StreamingPipeline::default();
    pipeline.run(Cursor::new(to_bytes(samples)), &mut sink).unwrap();
    from_bytes(&sink)
}

// ============================================================================
// FRAME ACCOUNTING
// ============================================================================

#[test]
fn test_partial_trailing_frame_is_discarded() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("raw.dat");
    let output = dir.path().join("filtered.dat");
    std::fs::write(&input, to_bytes(&vec![7; 2 * NUM_CHANNELS + 10])).unwrap();

    let mut pipeline: StreamingPipeline = StreamingPipeline::default();
    let summary = pipeline.run_files(&input, &output).unwrap();

    assert_eq!(summary.frames, 2);
    assert_eq!(summary.discarded_samples, 10);
    assert_eq!(summary.timing.frames, 2);
    assert_eq!(std::fs::metadata(&output).unwrap().len(), 2 * NUM_CHANNELS as u64 * 2);
    assert_eq!(pipeline.state(), PipelineState::Closed);
}

#[test]
fn test_empty_input_produces_empty_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("raw.dat");
    let output = dir.path().join("filtered.dat");
    std::fs::write(&input, b"").unwrap();

    let summary = StreamingPipeline::<NUM_CHANNELS>::default()
        .run_files(&input, &output)
        .unwrap();

    assert_eq!(summary.frames, 0);
    assert_eq!(summary.timing.avg_frame_us, 0.0);
    assert_eq!(summary.timing.avg_sample_us, 0.0);
    assert!(std::fs::read(&output).unwrap().is_empty());
}

#[test]
fn test_missing_source_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("filtered.dat");

    let err = StreamingPipeline::<NUM_CHANNELS>::default()
        .run_files(&dir.path().join("absent.dat"), &output)
        .unwrap_err();

    assert!(matches!(err, PipelineError::OpenSource { .. }));
    assert!(!output.exists());
}

// ============================================================================
// FILTER BEHAVIOUR
// ============================================================================

#[test]
fn test_constant_input_full_width() {
    let output = filter::<NUM_CHANNELS>(&vec![1000; 3 * NUM_CHANNELS]);

    assert_eq!(output.len(), 3 * NUM_CHANNELS);
    assert!(output[..NUM_CHANNELS].iter().all(|&s| s == 999));

    // Identical history on every channel means identical output on every channel
    for frame in output.chunks_exact(NUM_CHANNELS) {
        assert!(frame.iter().all(|&s| s == frame[0]));
        assert!((990..=1001).contains(&frame[0]), "frame value {}", frame[0]);
    }
}

#[test]
fn test_constant_input_settles_near_input() {
    let output = filter::<2>(&vec![1000; 2 * 32_000]);
    let tail = &output[output.len() - 2..];
    assert!(tail.iter().all(|&s| (999..=1001).contains(&s)), "tail {:?}", tail);
}

#[test]
fn test_zero_input_stays_zero() {
    let output = filter::<NUM_CHANNELS>(&vec![0; 4 * NUM_CHANNELS]);
    assert!(output.iter().all(|&s| s == 0));
}

#[test]
fn test_mains_hum_is_suppressed() {
    const CHANNELS: usize = 4;
    let input = sine_frames(CHANNELS, 32_000, 60.0, 10_000.0);
    let output = filter::<CHANNELS>(&input);

    for c in 0..CHANNELS {
        let raw = channel(&input, CHANNELS, c);
        let filtered = channel(&output, CHANNELS, c);
        let half = raw.len() / 2;
        let ratio = rms(&filtered[half..]) / rms(&raw[half..]);
        assert!(ratio < 0.1, "channel {c} kept {ratio:.3} of 60 Hz");
    }
}

#[test]
fn test_neural_band_passes() {
    const CHANNELS: usize = 4;
    let input = sine_frames(CHANNELS, 16_000, 1000.0, 10_000.0);
    let output = filter::<CHANNELS>(&input);

    let half = input.len() / 2;
    let ratio = rms(&output[half..]) / rms(&input[half..]);
    assert!((ratio - 1.0).abs() < 0.02, "1 kHz gain {ratio:.4}");
}

#[test]
fn test_channels_are_independent() {
    const CHANNELS: usize = 4;
    let mut input = sine_frames(CHANNELS, 500, 60.0, 5_000.0);
    let baseline = filter::<CHANNELS>(&input);

    // Silence channel 2 only; the other channels must not notice
    for frame in input.chunks_exact_mut(CHANNELS) {
        frame[2] = 0;
    }
    let altered = filter::<CHANNELS>(&input);

    for c in [0, 1, 3] {
        assert_eq!(channel(&baseline, CHANNELS, c), channel(&altered, CHANNELS, c));
    }
    assert!(channel(&altered, CHANNELS, 2).iter().all(|&s| s == 0));
}

#[test]
fn test_passthrough_is_identity() {
    let input = sine_frames(8, 100, 440.0, 30_000.0);
    let mut sink = Vec::new();
    let mut pipeline: StreamingPipeline<8> =
        StreamingPipeline::new(BiquadCoeffs::PASSTHROUGH, Duration::from_secs(1));

    pipeline.run(Cursor::new(to_bytes(&input)), &mut sink).unwrap();
    assert_eq!(from_bytes(&sink), input);
}

#[test]
fn test_config_budget_reaches_summary() {
    let config = PipelineConfig {
        realtime_budget_us: 250,
        ..PipelineConfig::default()
    };
    let mut sink = Vec::new();
    let mut pipeline: StreamingPipeline<4> = StreamingPipeline::from_config(&config);

    let summary = pipeline.run(Cursor::new(to_bytes(&[1; 8])), &mut sink).unwrap();
    assert!((summary.timing.budget_us - 250.0).abs() < 1e-9);
}

// ============================================================================
// COMPARISON
// ============================================================================

#[test]
fn test_compare_after_filtering_hum() {
    const CHANNELS: usize = 2;
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("raw.dat");
    let output = dir.path().join("filtered.dat");
    std::fs::write(&input, to_bytes(&sine_frames(CHANNELS, 32_000, 60.0, 8_000.0))).unwrap();

    StreamingPipeline::<CHANNELS>::default()
        .run_files(&input, &output)
        .unwrap();
    let cmp = compare_files::<CHANNELS>(&input, &output).unwrap();

    assert_eq!(cmp.input.frames, cmp.output.frames);
    assert!(cmp.rms_ratio().unwrap() < 0.5);
    assert!(cmp.level_change_db().unwrap() < -6.0);
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_runs_are_deterministic(samples in prop::collection::vec(any::<i16>(), 0..200)) {
        let first = filter::<4>(&samples);
        let second = filter::<4>(&samples);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_frame_count_is_conserved(samples in prop::collection::vec(any::<i16>(), 0..200)) {
        let mut sink = Vec::new();
        let mut pipeline: StreamingPipeline<8> = StreamingPipeline::default();
        let summary = pipeline.run(Cursor::new(to_bytes(&samples)), &mut sink).unwrap();

        prop_assert_eq!(summary.frames as usize, samples.len() / 8);
        prop_assert_eq!(summary.discarded_samples, samples.len() % 8);
        prop_assert_eq!(sink.len(), samples.len() / 8 * 8 * 2);
    }
}
