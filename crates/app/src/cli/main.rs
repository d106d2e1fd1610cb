//! Neurofilt CLI Application

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use neurofilt_core::domain::response::{DelayStats, DEFAULT_POINTS};
use neurofilt_core::domain::{BiquadCoeffs, PipelineConfig, StreamComparison, NUM_CHANNELS};
use neurofilt_infra::stream::{compare_files, Preview, RunSummary, StreamingPipeline};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neurofilt")]
#[command(about = "Real-time notch filtering of multi-channel neural recordings", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to the per-user config when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Filter a raw recording into a new file
    Filter(FilterArgs),
    /// Print the leading frames of a raw recording
    Preview(PreviewArgs),
    /// Report the frequency response of the notch filter
    Response(ResponseArgs),
    /// Compare a raw recording with its filtered output
    Compare(CompareArgs),
}

#[derive(Args)]
struct FilterArgs {
    /// Raw input recording
    input: Option<PathBuf>,

    /// Destination of the filtered stream
    output: Option<PathBuf>,

    /// Preview the raw input before filtering
    #[arg(short = 'd', long)]
    display: bool,

    /// Preview the filtered output after filtering
    #[arg(short = 'f', long)]
    show_filtered: bool,

    /// Per-frame real-time budget in microseconds
    #[arg(long)]
    budget_us: Option<u64>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl FilterArgs {
    // Stdout carries only the summary when --json is set
    fn announces_defaults(&self) -> bool {
        !self.json && (self.input.is_none() || self.output.is_none())
    }
}

#[derive(Args)]
struct PreviewArgs {
    /// Raw recording to preview (defaults to the configured input)
    file: Option<PathBuf>,

    /// Number of frames to show
    #[arg(short = 'n', long)]
    frames: Option<usize>,

    /// Also write the preview to this file
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Args)]
struct ResponseArgs {
    /// Sample rate in Hz (defaults to the configured acquisition rate)
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Number of frequency points between 0 and Nyquist
    #[arg(long, default_value_t = DEFAULT_POINTS)]
    points: usize,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CompareArgs {
    /// Raw recording (defaults to the configured input)
    input: Option<PathBuf>,

    /// Filtered recording (defaults to the configured output)
    output: Option<PathBuf>,

    /// Print the comparison as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    debug!("Neurofilt starting");

    let config = PipelineConfig::resolve(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    match cli.command {
        Command::Filter(args) => filter(args, config).await,
        Command::Preview(args) => preview(args, &config),
        Command::Response(args) => response(args, &config),
        Command::Compare(args) => compare(args, config).await,
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // RUST_LOG wins over -v when set
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn filter(args: FilterArgs, mut config: PipelineConfig) -> Result<()> {
    if let Some(budget_us) = args.budget_us {
        config.realtime_budget_us = budget_us;
        config.validate().context("Invalid --budget-us")?;
    }

    let announce = args.announces_defaults();
    let input = args.input.unwrap_or_else(|| config.input_path.clone());
    let output = args.output.unwrap_or_else(|| config.output_path.clone());
    if announce {
        println!("Using default filenames:");
        println!("  Input: {}", input.display());
        println!("  Output: {}", output.display());
    }

    if args.display {
        show_preview(&input, config.preview_frames, None).context("Error reading data")?;
    }

    let summary = {
        let input = input.clone();
        let output = output.clone();
        let config = config.clone();
        tokio::task::spawn_blocking(move || {
            let mut pipeline: StreamingPipeline<NUM_CHANNELS> = StreamingPipeline::from_config(&config);
            pipeline.run_files(&input, &output)
        })
        .await
        .context("Filtering task failed")?
        .context("Error processing data")?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if args.show_filtered {
        show_preview(&output, config.preview_frames, None).context("Error reading data")?;
    }

    if !args.json {
        println!("Processing complete. Filtered data saved to {}", output.display());
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let timing = &summary.timing;

    println!("Frames processed: {}", summary.frames);
    if summary.discarded_samples > 0 {
        println!(
            "Discarded trailing samples: {} (incomplete frame)",
            summary.discarded_samples
        );
    }
    println!("Average time per frame: {:.2} us", timing.avg_frame_us);
    println!("Average time per sample: {:.4} us", timing.avg_sample_us);
    if let Some(index) = timing.max_frame_index {
        println!("Slowest frame: {} ({:.2} us)", index, timing.max_frame_us);
    }
    println!(
        "Deadline violations: {} (budget {:.0} us per frame)",
        timing.violations, timing.budget_us
    );
}

fn show_preview(path: &Path, frames: usize, save: Option<&Path>) -> Result<usize> {
    let shown = Preview::<NUM_CHANNELS>::new(frames).write_file(path, save)?;
    if let Some(save) = save {
        println!("Data has been saved to {}", save.display());
    }
    Ok(shown)
}

fn preview(args: PreviewArgs, config: &PipelineConfig) -> Result<()> {
    let file = args.file.unwrap_or_else(|| config.input_path.clone());
    let frames = args.frames.unwrap_or(config.preview_frames);

    let shown = show_preview(&file, frames, args.save.as_deref()).context("Error reading data")?;
    info!(frames = shown, "Preview finished");
    Ok(())
}

fn response(args: ResponseArgs, config: &PipelineConfig) -> Result<()> {
    let sample_rate = args.sample_rate.unwrap_or(config.sample_rate_hz);
    anyhow::ensure!(
        sample_rate.is_finite() && sample_rate > 0.0,
        "Sample rate must be positive, got {}",
        sample_rate
    );

    let summary = BiquadCoeffs::NEURAL_NOTCH
        .sweep(sample_rate, args.points)
        .summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let to_us = |samples: f64| DelayStats::to_micros(samples, sample_rate);

    println!("Filter Response Statistics ({} points at {} Hz):", summary.points, sample_rate);
    println!("{}", "-".repeat(30));
    if let Some(delay) = summary.group_delay {
        println!("Average group delay: {:.2} samples ({:.2} us)", delay.mean_samples, to_us(delay.mean_samples));
        println!("Maximum group delay: {:.2} samples ({:.2} us)", delay.max_samples, to_us(delay.max_samples));
        println!("Minimum group delay: {:.2} samples ({:.2} us)", delay.min_samples, to_us(delay.min_samples));
    }
    if let Some(delay) = summary.passband_delay {
        println!("Average passband delay: {:.2} us", to_us(delay.mean_samples));
        println!("Maximum passband delay: {:.2} us", to_us(delay.max_samples));
        println!("Minimum passband delay: {:.2} us", to_us(delay.min_samples));
    }
    if let (Some(freq), Some(db)) = (summary.notch_hz, summary.notch_db) {
        println!("Deepest attenuation: {:.2} dB at {:.2} Hz", db, freq);
    }
    match summary.stop_band {
        Some(band) => {
            println!("-3dB Bandwidth: {:.2} Hz", band.width_hz());
            println!("Lower -3dB point: {:.2} Hz", band.lower_hz);
            println!("Upper -3dB point: {:.2} Hz", band.upper_hz);
        }
        None => println!("No frequency attenuated by 3dB or more at this resolution"),
    }

    Ok(())
}

async fn compare(args: CompareArgs, config: PipelineConfig) -> Result<()> {
    let input = args.input.unwrap_or(config.input_path);
    let output = args.output.unwrap_or(config.output_path);

    let comparison = tokio::task::spawn_blocking(move || compare_files::<NUM_CHANNELS>(&input, &output))
        .await
        .context("Comparison task failed")?
        .context("Error reading data")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print_comparison(&comparison);
    }
    Ok(())
}

fn print_comparison(cmp: &StreamComparison) {
    let range = |min: Option<i16>, max: Option<i16>| match (min, max) {
        (Some(min), Some(max)) => format!("[{}, {}]", min, max),
        _ => "[empty]".to_string(),
    };

    println!("Signal Statistics:");
    println!("{}", "-".repeat(30));
    println!("Input data shape: ({}, {})", cmp.input.frames, NUM_CHANNELS);
    println!("Output data shape: ({}, {})", cmp.output.frames, NUM_CHANNELS);
    println!("Input data range: {}", range(cmp.input.min, cmp.input.max));
    println!("Output data range: {}", range(cmp.output.min, cmp.output.max));

    println!("\nRMS Values:");
    println!("{}", "-".repeat(30));
    println!("Input RMS: {:.2}", cmp.input.rms());
    println!("Output RMS: {:.2}", cmp.output.rms());
    if let Some(ratio) = cmp.rms_ratio() {
        println!("RMS ratio (output/input): {:.4}", ratio);
    }
    if let Some(db) = cmp.level_change_db() {
        println!("Signal level change: {:.2} dB", db);
    }

    println!("\nMean and Standard Deviation:");
    println!("{}", "-".repeat(30));
    println!("Input mean: {:.2}, std: {:.2}", cmp.input.mean(), cmp.input.std_dev());
    println!("Output mean: {:.2}, std: {:.2}", cmp.output.mean(), cmp.output.std_dev());
    println!("Mean change: {:.2}", cmp.mean_change());
    if let Some(pct) = cmp.std_change_pct() {
        println!("Std change: {:.2}%", pct);
    }
}
