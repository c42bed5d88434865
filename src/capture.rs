use crate::compact::{self, CompactError};
use crate::config::{CaptureConfig, ChannelWidth, RAW_RECORD_SIZE};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::slice::ChunksExact;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Compaction error: {0}")]
    Compact(#[from] CompactError),

    #[error("Acquisition failed: {reason}")]
    Acquisition { reason: String },
}

/// Anything that can produce a raw capture: a USB analyzer, a file, a test
/// fixture. The device driver behind this seam is not part of this crate.
///
/// Implementations must hand back a buffer of whole [`RAW_RECORD_SIZE`]-byte
/// records covering all four channel groups.
pub trait CaptureSource {
    fn acquire(&mut self, config: &CaptureConfig) -> Result<Capture, CaptureError>;
}

/// A raw capture as read out of device memory, together with the
/// configuration it was taken under.
///
/// Consumed exactly once, either by [`Capture::compact`] or by dropping it.
#[derive(Debug)]
pub struct Capture {
    data: Vec<u8>,
    config: CaptureConfig,
}

impl Capture {
    pub fn new(data: Vec<u8>, config: CaptureConfig) -> Self {
        Self { data, config }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.data.len() / RAW_RECORD_SIZE
    }

    /// Strip the unused channel groups, consuming the raw capture.
    pub fn compact(mut self) -> Result<CompactedCapture, CompactError> {
        let width = self.config.channel_width();
        compact::compact_vec(&mut self.data, width)?;
        log::debug!(
            "compacted capture to {} bytes ({} channels)",
            self.data.len(),
            width
        );
        Ok(CompactedCapture {
            data: self.data,
            width,
        })
    }
}

/// A compacted capture: `record_count * width.record_size()` bytes, one
/// record per time step, oldest first.
#[derive(Debug)]
pub struct CompactedCapture {
    data: Vec<u8>,
    width: ChannelWidth,
}

impl CompactedCapture {
    /// Wrap an already-compacted buffer, e.g. one read back from disk.
    pub fn from_parts(data: Vec<u8>, width: ChannelWidth) -> Self {
        Self { data, width }
    }

    pub fn width(&self) -> ChannelWidth {
        self.width
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn record_count(&self) -> usize {
        self.data.len() / self.width.record_size()
    }

    /// Iterate over the decoded sample of every record.
    pub fn samples(&self) -> Samples<'_> {
        Samples {
            chunks: self.data.chunks_exact(self.width.record_size()),
        }
    }

    /// Write the compacted buffer verbatim, byte for byte, no header.
    pub fn write_raw<W: Write>(&self, out: &mut W) -> Result<(), CaptureError> {
        out.write_all(&self.data)?;
        Ok(())
    }

    /// [`CompactedCapture::write_raw`] to a fresh file at `path`.
    pub fn write_raw_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CaptureError> {
        let mut file = File::create(path.as_ref())?;
        self.write_raw(&mut file)?;
        log::info!(
            "wrote {} bytes to {}",
            self.data.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}

/// Decode one record as a little-endian unsigned integer. Channel groups
/// beyond the record are zero, never indeterminate.
pub(crate) fn decode_sample(record: &[u8]) -> u32 {
    let mut value = 0u32;
    for (i, byte) in record.iter().enumerate() {
        value |= u32::from(*byte) << (8 * i);
    }
    value
}

/// Iterator over decoded samples of a [`CompactedCapture`].
pub struct Samples<'a> {
    chunks: ChunksExact<'a, u8>,
}

impl Iterator for Samples<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        self.chunks.next().map(decode_sample)
    }
}

impl ExactSizeIterator for Samples<'_> {
    fn len(&self) -> usize {
        self.chunks.len()
    }
}
