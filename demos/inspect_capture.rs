// Summarize a raw capture dump: record count and per-line toggle counts.

use clap::Parser;
use std::path::PathBuf;
use zeroprobe_rs::{Capture, CaptureConfig, ChannelWidth, WIRE_NAMES};

#[derive(Parser)]
#[command(about = "Summarize a raw Zeroplus capture dump")]
struct Args {
    /// Raw capture file as read out of device memory
    input: PathBuf,

    /// Channel count (8, 16 or 32)
    #[arg(short, long, default_value_t = 8)]
    channels: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let width = ChannelWidth::try_from(args.channels)?;
    let config = CaptureConfig::builder().channel_width(width).build()?;

    let data = std::fs::read(&args.input)?;
    let capture = Capture::new(data, config);
    println!("{}: {} records", args.input.display(), capture.record_count());

    let compacted = capture.compact()?;

    let mut toggles = vec![0u64; width.bits() as usize];
    let mut previous: Option<u32> = None;
    for sample in compacted.samples() {
        if let Some(previous) = previous {
            let changed = previous ^ sample;
            for (line, count) in toggles.iter_mut().enumerate() {
                if (changed >> line) & 1 == 1 {
                    *count += 1;
                }
            }
        }
        previous = Some(sample);
    }

    println!("toggles per line:");
    for (line, count) in toggles.iter().enumerate() {
        if *count > 0 {
            println!("  {:>3}  {}", WIRE_NAMES[line], count);
        }
    }

    Ok(())
}
