//! Example demonstrating the pipeline configuration and a short filter run
//!
//! Run with: cargo run --package neurofilt-core --example config_demo

use neurofilt_core::domain::{decode_sample, encode_sample, FilterBank, PipelineConfig};

const CHANNELS: usize = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("neurofilt_core=debug,info")
        .init();

    println!("=== Neurofilt Configuration Demo ===\n");

    // 1. Default configuration
    println!("1. Creating default configuration...");
    let config = PipelineConfig {
        realtime_budget_us: 500,
        ..PipelineConfig::default()
    };
    config.validate()?;
    println!("   ✓ Frame budget: {:?}", config.realtime_budget());

    // 2. Save configuration to file
    println!("\n2. Saving configuration to file...");
    let config_path = std::env::temp_dir().join("neurofilt_demo_config.toml");
    config.save_to_file(&config_path).await?;
    println!("   ✓ Configuration saved to {}", config_path.display());

    // 3. Load configuration from file
    println!("\n3. Loading configuration from file...");
    let loaded = PipelineConfig::load_from_file(&config_path).await?;
    println!("   ✓ Loaded input path {}", loaded.input_path.display());
    println!("   ✓ Round trip equal: {}", loaded == config);

    // 4. Filter a few frames of a constant signal
    println!("\n4. Filtering a constant 1000 on {} channels:", CHANNELS);
    let mut bank: FilterBank<CHANNELS> = FilterBank::default();
    let input = [1000_i16; CHANNELS];
    let mut output = [0_i16; CHANNELS];
    for frame in 1..=5 {
        bank.process_frame(&input, &mut output);
        println!("   Frame {}: {:?}", frame, output);
    }

    // 5. Saturation at the codec boundary
    println!("\n5. Codec saturation:");
    for value in [40_000.0_f32, -40_000.0, 999.9, -999.9] {
        println!("   {:>9.1} -> {}", value, encode_sample(value));
    }
    println!("   {} -> {:.1}", i16::MIN, decode_sample(i16::MIN));

    tokio::fs::remove_file(&config_path).await?;
    println!("\n✓ Demo complete");
    Ok(())
}
