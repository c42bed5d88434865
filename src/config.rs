use crate::trigger_config::{Filter, Trigger, TriggerError, TriggerSet};
use std::fmt;
use std::str::FromStr;

/// Number of bytes one raw (uncompacted) record occupies in device memory.
///
/// The analyzer always stores all four channel groups, even when fewer
/// channels are enabled.
pub const RAW_RECORD_SIZE: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported channel width: {bits} (must be 8, 16 or 32)")]
    UnsupportedChannelWidth { bits: u32 },

    #[error("Sampling frequency must not be zero")]
    ZeroFrequency,

    #[error("Sampling frequency too high (max 200 MHz)")]
    FrequencyTooHigh,

    #[error("Invalid sampling frequency: {input}")]
    InvalidFrequency { input: String },

    #[error("Invalid pre-trigger {percent}% > 100%")]
    PreTriggerOutOfRange { percent: u8 },

    #[error("Trigger error: {0}")]
    Trigger(#[from] TriggerError),
}

/// Number of enabled logic channels for a capture.
///
/// Determines how many of the four channel-group bytes of every raw record
/// are meaningful, and therefore the record size after compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelWidth {
    W8,
    W16,
    W32,
}

impl ChannelWidth {
    /// Number of enabled channels.
    pub fn bits(self) -> u32 {
        match self {
            ChannelWidth::W8 => 8,
            ChannelWidth::W16 => 16,
            ChannelWidth::W32 => 32,
        }
    }

    /// Bytes per record once the unused channel groups are stripped.
    pub fn record_size(self) -> usize {
        match self {
            ChannelWidth::W8 => 1,
            ChannelWidth::W16 => 2,
            ChannelWidth::W32 => 4,
        }
    }

    /// Number of 8-channel groups (A, B, C, D) carried per record.
    pub fn group_count(self) -> usize {
        self.record_size()
    }
}

impl TryFrom<u32> for ChannelWidth {
    type Error = ConfigError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(ChannelWidth::W8),
            16 => Ok(ChannelWidth::W16),
            32 => Ok(ChannelWidth::W32),
            _ => Err(ConfigError::UnsupportedChannelWidth { bits }),
        }
    }
}

impl fmt::Display for ChannelWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyScale {
    Hz,
    Khz,
    Mhz,
}

impl FrequencyScale {
    pub fn as_str(self) -> &'static str {
        match self {
            FrequencyScale::Hz => "Hz",
            FrequencyScale::Khz => "KHz",
            FrequencyScale::Mhz => "MHz",
        }
    }

    /// Unit of one simulated time step at this scale, as spelled in the
    /// trace header.
    pub fn timescale_unit(self) -> &'static str {
        match self {
            FrequencyScale::Hz => "ms",
            FrequencyScale::Khz => "us",
            FrequencyScale::Mhz => "ns",
        }
    }
}

/// Sampling frequency of a capture: a value and its scale unit.
///
/// Construction normalizes the value into the canonical scale (1000 Hz
/// becomes 1 KHz and so on) and rejects rates the hardware cannot reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingRate {
    value: u32,
    scale: FrequencyScale,
}

impl SamplingRate {
    /// Highest supported rate, in MHz.
    const MAX_MHZ: u32 = 200;

    pub fn new(value: u32, scale: FrequencyScale) -> Result<Self, ConfigError> {
        if value == 0 {
            return Err(ConfigError::ZeroFrequency);
        }

        let (mut value, mut scale) = (value, scale);
        if scale == FrequencyScale::Hz && value >= 1000 {
            scale = FrequencyScale::Khz;
            value /= 1000;
        }
        if scale == FrequencyScale::Khz && value >= 1000 {
            scale = FrequencyScale::Mhz;
            value /= 1000;
        }
        if scale == FrequencyScale::Mhz && value > Self::MAX_MHZ {
            return Err(ConfigError::FrequencyTooHigh);
        }

        Ok(Self { value, scale })
    }

    pub fn value(self) -> u32 {
        self.value
    }

    pub fn scale(self) -> FrequencyScale {
        self.scale
    }

    /// Length of one simulated time step, in units of
    /// [`FrequencyScale::timescale_unit`]. Integer division; a remainder is
    /// discarded.
    pub fn timescale_units(self) -> u32 {
        1000 / self.value
    }
}

impl FromStr for SamplingRate {
    type Err = ConfigError;

    /// Parses rates like `"100"`, `"500KHz"` or `"100MHz"`. A bare number
    /// is taken as Hz.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let value: u32 = s[..digits]
            .parse()
            .map_err(|_| ConfigError::InvalidFrequency {
                input: s.to_string(),
            })?;

        let scale = match s[digits..].trim() {
            "" => FrequencyScale::Hz,
            suffix if suffix.eq_ignore_ascii_case("hz") => FrequencyScale::Hz,
            suffix if suffix.eq_ignore_ascii_case("khz") => FrequencyScale::Khz,
            suffix if suffix.eq_ignore_ascii_case("mhz") => FrequencyScale::Mhz,
            _ => {
                return Err(ConfigError::InvalidFrequency {
                    input: s.to_string(),
                })
            }
        };

        Self::new(value, scale)
    }
}

impl fmt::Display for SamplingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.scale.as_str())
    }
}

/// Portion of device memory filled before the trigger fires, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreTrigger(u8);

impl PreTrigger {
    pub fn percent(percent: u8) -> Result<Self, ConfigError> {
        if percent > 100 {
            return Err(ConfigError::PreTriggerOutOfRange { percent });
        }
        Ok(Self(percent))
    }

    pub fn as_percent(self) -> u8 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Immutable configuration for one capture run.
///
/// Built once via [`CaptureConfig::builder`] and passed by reference into
/// every pipeline stage; nothing reads ambient process state.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    channel_width: ChannelWidth,
    sampling_rate: SamplingRate,
    triggers: TriggerSet,
    filters: Vec<Filter>,
    pre_trigger: PreTrigger,
}

impl CaptureConfig {
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::new()
    }

    pub fn channel_width(&self) -> ChannelWidth {
        self.channel_width
    }

    pub fn sampling_rate(&self) -> SamplingRate {
        self.sampling_rate
    }

    pub fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn pre_trigger(&self) -> PreTrigger {
        self.pre_trigger
    }
}

#[derive(Debug, Default)]
pub struct CaptureConfigBuilder {
    channel_width: Option<ChannelWidth>,
    sampling_rate: Option<SamplingRate>,
    triggers: Vec<Trigger>,
    filters: Vec<Filter>,
    pre_trigger_percent: u8,
}

impl CaptureConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_width(mut self, width: ChannelWidth) -> Self {
        self.channel_width = Some(width);
        self
    }

    pub fn sampling_rate(mut self, rate: SamplingRate) -> Self {
        self.sampling_rate = Some(rate);
        self
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn pre_trigger(mut self, percent: u8) -> Self {
        self.pre_trigger_percent = percent;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// Arms the collected triggers (at most one edge trigger may be armed)
    /// and checks the pre-trigger range. A nonzero pre-trigger without any
    /// armed trigger cannot take effect and falls back to zero.
    pub fn build(self) -> Result<CaptureConfig, ConfigError> {
        let channel_width = self.channel_width.unwrap_or(ChannelWidth::W32);
        let sampling_rate = match self.sampling_rate {
            Some(rate) => rate,
            None => SamplingRate::new(100, FrequencyScale::Mhz)?,
        };

        let mut triggers = TriggerSet::new();
        for trigger in self.triggers {
            triggers.arm(trigger)?;
        }

        let mut pre_trigger = PreTrigger::percent(self.pre_trigger_percent)?;
        if !pre_trigger.is_zero() && triggers.is_empty() {
            log::warn!(
                "pre-trigger {}% has no effect without a trigger, using 0 instead",
                pre_trigger.as_percent()
            );
            pre_trigger = PreTrigger::default();
        }

        Ok(CaptureConfig {
            channel_width,
            sampling_rate,
            triggers,
            filters: self.filters,
            pre_trigger,
        })
    }
}
