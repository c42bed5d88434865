// Convert a raw Zeroplus capture dump into a VCD trace (or a compacted
// binary dump with --raw).

use clap::Parser;
use std::path::PathBuf;
use zeroprobe_rs::{
    Capture, CaptureConfig, CaptureError, CaptureSource, ChannelWidth, SamplingRate,
};

#[derive(Parser)]
#[command(about = "Convert a raw Zeroplus capture dump into a VCD trace")]
struct Args {
    /// Raw capture file as read out of device memory
    input: PathBuf,

    /// Output file
    output: PathBuf,

    /// Channel count (8, 16 or 32)
    #[arg(short, long, default_value_t = 32)]
    channels: u32,

    /// Sampling frequency, e.g. 100MHz or 500KHz
    #[arg(short, long, default_value = "100MHz")]
    freq: String,

    /// Write the compacted buffer verbatim instead of a VCD trace
    #[arg(long)]
    raw: bool,
}

/// A capture source backed by a file instead of a live analyzer.
struct FileSource {
    path: PathBuf,
}

impl CaptureSource for FileSource {
    fn acquire(&mut self, config: &CaptureConfig) -> Result<Capture, CaptureError> {
        let data = std::fs::read(&self.path)?;
        Ok(Capture::new(data, config.clone()))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let rate: SamplingRate = args.freq.parse()?;
    let config = CaptureConfig::builder()
        .channel_width(ChannelWidth::try_from(args.channels)?)
        .sampling_rate(rate)
        .build()?;

    let mut source = FileSource {
        path: args.input.clone(),
    };
    let capture = source.acquire(&config)?;
    println!(
        "read {} records ({} bytes) from {}",
        capture.record_count(),
        capture.len(),
        args.input.display()
    );

    let compacted = capture.compact()?;

    if args.raw {
        compacted.write_raw_file(&args.output)?;
        println!(
            "wrote {} bytes to {}",
            compacted.as_bytes().len(),
            args.output.display()
        );
    } else {
        println!("writing VCD file (this might take a while)...");
        zeroprobe_rs::vcd::write_vcd_file(&args.output, &compacted, rate)?;
        println!("wrote VCD trace to {}", args.output.display());
    }

    Ok(())
}
