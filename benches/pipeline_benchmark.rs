//! Criterion benchmarks for end-to-end filtering throughput
//!
//! Measures:
//! - Full-width runs over in-memory streams
//! - Sensitivity to channel count
//! - Signal content (silence, mains hum, noise)

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use neurofilt_benchmarks::{generate_noise, generate_sine_frames, to_raw_bytes};
use neurofilt_core::domain::NUM_CHANNELS;
use neurofilt_infra::stream::StreamingPipeline;
use std::hint::black_box;
use std::io::Cursor;

const SAMPLE_RATE: f64 = 32_000.0;
const FRAMES: usize = 3_200;

fn run_once<const N: usize>(pipeline: &mut StreamingPipeline<N>, input: &[u8], sink: &mut Vec<u8>) {
    sink.clear();
    let summary = pipeline
        .run(Cursor::new(input), &mut *sink)
        .unwrap_or_else(|e| panic!("benchmark run failed: {e}"));
    black_box(summary);
}

fn bench_full_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_full_width");
    group.throughput(Throughput::Elements((FRAMES * NUM_CHANNELS) as u64));

    let signals = [
        ("silence", vec![0_i16; FRAMES * NUM_CHANNELS]),
        ("mains_hum", generate_sine_frames(60.0, SAMPLE_RATE, NUM_CHANNELS, FRAMES, 8_000.0)),
        ("noise", generate_noise(FRAMES * NUM_CHANNELS, 42)),
    ];

    for (name, samples) in signals.iter() {
        let input = to_raw_bytes(samples);
        let mut sink = Vec::with_capacity(input.len());
        let mut pipeline: StreamingPipeline<NUM_CHANNELS> = StreamingPipeline::default();

        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, input| {
            b.iter(|| run_once(&mut pipeline, black_box(input), &mut sink));
        });
    }

    group.finish();
}

fn bench_channel_count<const N: usize>(group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>) {
    let input = to_raw_bytes(&generate_sine_frames(1000.0, SAMPLE_RATE, N, FRAMES, 8_000.0));
    let mut sink = Vec::with_capacity(input.len());
    let mut pipeline: StreamingPipeline<N> = StreamingPipeline::default();

    group.throughput(Throughput::Elements((FRAMES * N) as u64));
    group.bench_with_input(BenchmarkId::from_parameter(N), &input, |b, input| {
        b.iter(|| run_once(&mut pipeline, black_box(input), &mut sink));
    });
}

fn bench_channel_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_channels");

    bench_channel_count::<32>(&mut group);
    bench_channel_count::<64>(&mut group);
    bench_channel_count::<128>(&mut group);
    bench_channel_count::<256>(&mut group);
    bench_channel_count::<512>(&mut group);

    group.finish();
}

criterion_group!(benches, bench_full_width, bench_channel_scaling);
criterion_main!(benches);
