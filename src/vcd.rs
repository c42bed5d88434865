use crate::capture::{decode_sample, CompactedCapture};
use crate::config::{ChannelWidth, SamplingRate};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Names of the 32 probe lines, indexed by flat channel number.
pub const WIRE_NAMES: [&str; 32] = [
    "A0", "A1", "A2", "A3", "A4", "A5", "A6", "A7", //
    "B0", "B1", "B2", "B3", "B4", "B5", "B6", "B7", //
    "C0", "C1", "C2", "C3", "C4", "C5", "C6", "C7", //
    "D0", "D1", "D2", "D3", "D4", "D5", "D6", "D7",
];

/// Single-character VCD identifier of channel `index`.
///
/// Identifiers start at `'!'` and run through the printable ASCII range,
/// one per channel.
pub fn wire_symbol(index: u8) -> char {
    debug_assert!(index < 32);
    (b'!' + index) as char
}

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Streams a VCD trace of a compacted capture into a sink.
///
/// The dialect written here is a compatibility contract with downstream
/// waveform viewers; token spelling and ordering must not change.
pub struct VcdWriter<W: Write> {
    out: W,
    width: ChannelWidth,
    rate: SamplingRate,
}

impl<W: Write> VcdWriter<W> {
    pub fn new(out: W, width: ChannelWidth, rate: SamplingRate) -> Self {
        Self { out, width, rate }
    }

    /// Write the metadata blocks, timescale, signal declarations and
    /// end-of-definitions marker, then flush.
    ///
    /// Flushing here guarantees a parseable header even if writing the data
    /// section fails partway.
    pub fn write_header(&mut self) -> Result<(), TraceError> {
        writeln!(self.out, "$date")?;
        writeln!(self.out, "$end")?;
        writeln!(self.out, "$version")?;
        writeln!(
            self.out,
            "{} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )?;
        writeln!(self.out, "$end")?;
        writeln!(self.out, "$comment")?;
        writeln!(self.out, "zeroplus logic analyzer capture")?;
        writeln!(self.out, "$end")?;

        writeln!(
            self.out,
            "$timescale {} {} $end",
            self.rate.timescale_units(),
            self.rate.scale().timescale_unit()
        )?;

        writeln!(self.out, "$scope module logic $end")?;
        for index in 0..self.width.bits() as u8 {
            writeln!(
                self.out,
                "$var wire 1 {} {} $end",
                wire_symbol(index),
                WIRE_NAMES[index as usize]
            )?;
        }
        writeln!(self.out, "$upscope $end")?;
        writeln!(self.out, "$enddefinitions $end")?;
        self.out.flush()?;

        Ok(())
    }

    /// Scan the compacted buffer and write one timestamped event per change
    /// of sample value, then the end-of-trace marker.
    ///
    /// The cursor advances by one record per time step whether or not an
    /// event is emitted, so the final marker equals the record count.
    pub fn write_data(&mut self, data: &[u8]) -> Result<(), TraceError> {
        let mut time: u64 = 0;
        let mut previous: Option<u32> = None;

        for record in data.chunks_exact(self.width.record_size()) {
            let sample = decode_sample(record);
            if previous != Some(sample) {
                writeln!(self.out, "#{time}")?;
                self.write_record_bits(record)?;
                previous = Some(sample);
            }
            time += 1;
        }

        // trailing marker so viewers know the trace length
        writeln!(self.out, "#{time}")?;
        for index in 0..self.width.bits() as u8 {
            writeln!(self.out, "x{}", wire_symbol(index))?;
        }

        Ok(())
    }

    /// One `<bit><symbol>` line per channel of the record, least
    /// significant bit of each group first.
    fn write_record_bits(&mut self, record: &[u8]) -> Result<(), TraceError> {
        for (group, byte) in record.iter().enumerate() {
            for bit in 0..8u8 {
                let value = if (byte >> bit) & 1 == 1 { '1' } else { '0' };
                writeln!(
                    self.out,
                    "{}{}",
                    value,
                    wire_symbol(group as u8 * 8 + bit)
                )?;
            }
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Write a complete trace of `capture` to `out`.
pub fn emit<W: Write>(
    out: W,
    capture: &CompactedCapture,
    rate: SamplingRate,
) -> Result<(), TraceError> {
    let mut writer = VcdWriter::new(out, capture.width(), rate);
    writer.write_header()?;
    writer.write_data(capture.as_bytes())?;
    Ok(())
}

/// [`emit`] into a fresh file at `path`.
pub fn write_vcd_file<P: AsRef<Path>>(
    path: P,
    capture: &CompactedCapture,
    rate: SamplingRate,
) -> Result<(), TraceError> {
    log::debug!("writing VCD trace to {}", path.as_ref().display());
    let file = File::create(path.as_ref())?;
    let mut out = BufWriter::new(file);
    emit(&mut out, capture, rate)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrequencyScale;
    use pretty_assertions::assert_eq;

    fn rate_100mhz() -> SamplingRate {
        SamplingRate::new(100, FrequencyScale::Mhz).unwrap()
    }

    fn emit_to_string(data: Vec<u8>, width: ChannelWidth, rate: SamplingRate) -> String {
        let capture = CompactedCapture::from_parts(data, width);
        let mut out = Vec::new();
        emit(&mut out, &capture, rate).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_symbol_table_determinism() {
        for index in 0..32u8 {
            assert_eq!(wire_symbol(index) as u32, 33 + u32::from(index));
        }
        assert_eq!(wire_symbol(0), '!');
        assert_eq!(WIRE_NAMES[0], "A0");
        assert_eq!(WIRE_NAMES[8], "B0");
        assert_eq!(WIRE_NAMES[31], "D7");

        let mut names = WIRE_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 32);
    }

    #[test]
    fn test_trace_8_channels_golden() {
        let trace = emit_to_string(vec![0x01, 0x01, 0x02], ChannelWidth::W8, rate_100mhz());

        let expected = format!(
            r##"$date
$end
$version
{} {}
$end
$comment
zeroplus logic analyzer capture
$end
$timescale 10 ns $end
$scope module logic $end
$var wire 1 ! A0 $end
$var wire 1 " A1 $end
$var wire 1 # A2 $end
$var wire 1 $ A3 $end
$var wire 1 % A4 $end
$var wire 1 & A5 $end
$var wire 1 ' A6 $end
$var wire 1 ( A7 $end
$upscope $end
$enddefinitions $end
#0
1!
0"
0#
0$
0%
0&
0'
0(
#2
0!
1"
0#
0$
0%
0&
0'
0(
#3
x!
x"
x#
x$
x%
x&
x'
x(
"##,
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );

        assert_eq!(trace, expected);
    }

    #[test]
    fn test_empty_capture_trace() {
        let trace = emit_to_string(Vec::new(), ChannelWidth::W8, rate_100mhz());

        let data_section = trace.split("$enddefinitions $end\n").nth(1).unwrap();
        let lines: Vec<&str> = data_section.lines().collect();
        assert_eq!(lines[0], "#0");
        assert_eq!(lines.len(), 9);
        for (index, line) in lines[1..].iter().enumerate() {
            assert_eq!(*line, format!("x{}", wire_symbol(index as u8)));
        }
    }

    #[test]
    fn test_event_count_matches_runs() {
        // runs: [5 5] [7 7 7] [5] -> three events plus the trailing marker
        let trace = emit_to_string(vec![5, 5, 7, 7, 7, 5], ChannelWidth::W8, rate_100mhz());

        let data_section = trace.split("$enddefinitions $end\n").nth(1).unwrap();
        let markers: Vec<&str> = data_section
            .lines()
            .filter(|line| line.starts_with('#'))
            .collect();
        assert_eq!(markers, vec!["#0", "#2", "#5", "#6"]);
    }

    #[test]
    fn test_unchanged_run_still_consumes_records() {
        // a trace that never changes still ends at the true record count
        let trace = emit_to_string(vec![3, 3, 3, 3], ChannelWidth::W8, rate_100mhz());

        let data_section = trace.split("$enddefinitions $end\n").nth(1).unwrap();
        let markers: Vec<&str> = data_section
            .lines()
            .filter(|line| line.starts_with('#'))
            .collect();
        assert_eq!(markers, vec!["#0", "#4"]);
    }

    #[test]
    fn test_trace_16_channels_groups() {
        // one record, A = 0x01, B = 0x80
        let trace = emit_to_string(vec![0x01, 0x80], ChannelWidth::W16, rate_100mhz());

        assert!(trace.contains("$var wire 1 ! A0 $end"));
        assert!(trace.contains("$var wire 1 ) B0 $end"));
        assert!(!trace.contains(" C0 "));

        let data_section = trace.split("$enddefinitions $end\n").nth(1).unwrap();
        let lines: Vec<&str> = data_section.lines().collect();
        assert_eq!(lines[0], "#0");
        // A0 high, rest of group A low
        assert_eq!(lines[1], "1!");
        assert_eq!(lines[2], "0\"");
        // B7 is channel 15, symbol '0'
        assert_eq!(lines[16], "10");
        // event block carries 16 bit lines, then the trailer
        assert_eq!(lines[17], "#1");
    }

    #[test]
    fn test_timescale_line_per_scale() {
        let khz = SamplingRate::new(500, FrequencyScale::Khz).unwrap();
        let trace = emit_to_string(Vec::new(), ChannelWidth::W8, khz);
        assert!(trace.contains("$timescale 2 us $end"));

        let hz = SamplingRate::new(10, FrequencyScale::Hz).unwrap();
        let trace = emit_to_string(Vec::new(), ChannelWidth::W8, hz);
        assert!(trace.contains("$timescale 100 ms $end"));
    }

    #[test]
    fn test_header_declares_all_32_signals() {
        let trace = emit_to_string(Vec::new(), ChannelWidth::W32, rate_100mhz());
        for (index, name) in WIRE_NAMES.iter().enumerate() {
            let line = format!("$var wire 1 {} {} $end", wire_symbol(index as u8), name);
            assert!(trace.contains(&line), "missing declaration: {line}");
        }
    }

    #[test]
    fn test_zero_extension_prevents_spurious_events() {
        // equal bytes must compare equal regardless of decode register width
        let trace = emit_to_string(vec![0xff, 0xff, 0xff], ChannelWidth::W8, rate_100mhz());
        let data_section = trace.split("$enddefinitions $end\n").nth(1).unwrap();
        let markers: Vec<&str> = data_section
            .lines()
            .filter(|line| line.starts_with('#'))
            .collect();
        assert_eq!(markers, vec!["#0", "#3"]);
    }
}
