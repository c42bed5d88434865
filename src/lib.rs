//! # Zeroprobe RS
//!
//! A Rust library for working with captures from Zeroplus 32-channel USB
//! logic analyzers.
//!
//! This library provides the host-side half of a capture pipeline: value
//! types for configuring a capture (channel width, sampling rate, trigger
//! and filter conditions), compaction of the raw 4-byte-per-record device
//! buffer down to the enabled channel groups, and export of the result as
//! either a raw binary dump or a VCD waveform trace readable by GTKWave and
//! friends. The USB driver itself sits behind the [`CaptureSource`] trait
//! and is not part of this crate.
//!
//! ## Features
//!
//! - **Capture configuration**: immutable config values built with a
//!   builder, validated once
//! - **Trigger configuration**: level and edge conditions parsed from
//!   `a0:posedge`-style strings
//! - **Channel compaction**: in-place stripping of unused channel groups
//! - **VCD export**: change-triggered waveform traces with the fixed
//!   `A0..D7` signal table
//! - **Type safety**: strong typing and error handling throughout
//!
//! ## Examples
//!
//! ### Compacting a capture and exporting a trace
//!
//! ```rust
//! use zeroprobe_rs::{Capture, CaptureConfig, ChannelWidth, FrequencyScale, SamplingRate};
//!
//! let config = CaptureConfig::builder()
//!     .channel_width(ChannelWidth::W8)
//!     .sampling_rate(SamplingRate::new(100, FrequencyScale::Mhz)?)
//!     .build()?;
//! let rate = config.sampling_rate();
//!
//! // one record per time step, four bytes per record off the device
//! let capture = Capture::new(vec![0x01, 0, 0, 0, 0x02, 0, 0, 0], config);
//! let compacted = capture.compact()?;
//! assert_eq!(compacted.as_bytes(), &[0x01, 0x02]);
//!
//! let mut trace = Vec::new();
//! zeroprobe_rs::vcd::emit(&mut trace, &compacted, rate)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Trigger conditions
//!
//! ```rust
//! use zeroprobe_rs::TriggerSet;
//!
//! let mut triggers = TriggerSet::new();
//! triggers.arm("a0:posedge".parse()?)?;
//! triggers.arm("c7:hi".parse()?)?;
//! # Ok::<(), zeroprobe_rs::TriggerError>(())
//! ```
//!
//! ### Raw output mode
//!
//! ```rust,no_run
//! use zeroprobe_rs::{CompactedCapture, ChannelWidth};
//!
//! let compacted = CompactedCapture::from_parts(vec![0x01, 0x02], ChannelWidth::W8);
//! compacted.write_raw_file("capture.bin")?;
//! # Ok::<(), zeroprobe_rs::CaptureError>(())
//! ```

pub mod capture;
pub mod compact;
pub mod config;
pub mod trigger_config;
pub mod vcd;

// Re-export the main types for convenience
pub use config::{
    CaptureConfig, CaptureConfigBuilder, ChannelWidth, ConfigError, FrequencyScale, PreTrigger,
    SamplingRate, RAW_RECORD_SIZE,
};

pub use trigger_config::{
    ChannelGroup, Filter, FilterLevel, ProbeLine, Trigger, TriggerError, TriggerKind, TriggerSet,
};

pub use capture::{Capture, CaptureError, CaptureSource, CompactedCapture, Samples};

pub use compact::{compact_in_place, compact_vec, CompactError};

pub use vcd::{emit, wire_symbol, write_vcd_file, TraceError, VcdWriter, WIRE_NAMES};
