use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Invalid probe line: {input}")]
    InvalidLine { input: String },

    #[error("Invalid condition: {input} (expected hi, lo, posedge, negedge or anyedge)")]
    InvalidCondition { input: String },

    #[error("Invalid filter level: {input} (expected hi or lo)")]
    InvalidFilterLevel { input: String },

    #[error("Only one trigger on a signal edge is possible")]
    EdgeTriggerAlreadyArmed,
}

/// One of the four 8-channel probe groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelGroup {
    A,
    B,
    C,
    D,
}

impl ChannelGroup {
    /// Index of this group's first channel in the flat 0..32 numbering.
    pub fn base_index(self) -> u8 {
        match self {
            ChannelGroup::A => 0,
            ChannelGroup::B => 8,
            ChannelGroup::C => 16,
            ChannelGroup::D => 24,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(ChannelGroup::A),
            'b' => Some(ChannelGroup::B),
            'c' => Some(ChannelGroup::C),
            'd' => Some(ChannelGroup::D),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelGroup::A => "A",
            ChannelGroup::B => "B",
            ChannelGroup::C => "C",
            ChannelGroup::D => "D",
        }
    }
}

/// A single probe line, addressed as group letter plus bit, e.g. `a0` or
/// `C7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeLine {
    group: ChannelGroup,
    bit: u8,
}

impl ProbeLine {
    pub fn new(group: ChannelGroup, bit: u8) -> Option<Self> {
        if bit > 7 {
            return None;
        }
        Some(Self { group, bit })
    }

    pub fn group(self) -> ChannelGroup {
        self.group
    }

    pub fn bit(self) -> u8 {
        self.bit
    }

    /// Flat channel index 0..32, as used by the wire tables.
    pub fn index(self) -> u8 {
        self.group.base_index() | self.bit
    }
}

impl FromStr for ProbeLine {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TriggerError::InvalidLine {
            input: s.to_string(),
        };

        let mut chars = s.chars();
        let group = chars
            .next()
            .and_then(ChannelGroup::from_char)
            .ok_or_else(invalid)?;
        let bit: u8 = chars.as_str().parse().map_err(|_| invalid())?;

        ProbeLine::new(group, bit).ok_or_else(invalid)
    }
}

impl fmt::Display for ProbeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.group.as_str(), self.bit)
    }
}

/// Condition under which the analyzer starts a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    High,
    Low,
    PosEdge,
    NegEdge,
    AnyEdge,
}

impl TriggerKind {
    /// Edge triggers occupy the device's single edge detector.
    pub fn is_edge(self) -> bool {
        matches!(
            self,
            TriggerKind::PosEdge | TriggerKind::NegEdge | TriggerKind::AnyEdge
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TriggerKind::High => "hi",
            TriggerKind::Low => "lo",
            TriggerKind::PosEdge => "posedge",
            TriggerKind::NegEdge => "negedge",
            TriggerKind::AnyEdge => "anyedge",
        }
    }
}

impl FromStr for TriggerKind {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hi" => Ok(TriggerKind::High),
            "lo" => Ok(TriggerKind::Low),
            "posedge" => Ok(TriggerKind::PosEdge),
            "negedge" => Ok(TriggerKind::NegEdge),
            "anyedge" => Ok(TriggerKind::AnyEdge),
            _ => Err(TriggerError::InvalidCondition {
                input: s.to_string(),
            }),
        }
    }
}

/// A trigger condition on one probe line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub line: ProbeLine,
    pub kind: TriggerKind,
}

impl Trigger {
    pub fn new(line: ProbeLine, kind: TriggerKind) -> Self {
        Self { line, kind }
    }
}

impl FromStr for Trigger {
    type Err = TriggerError;

    /// Parses `"<line>:<condition>"`, e.g. `"a0:posedge"` or `"c7:lo"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, kind) = s.split_once(':').ok_or_else(|| TriggerError::InvalidLine {
            input: s.to_string(),
        })?;
        Ok(Self {
            line: line.parse()?,
            kind: kind.parse()?,
        })
    }
}

/// Channel level filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterLevel {
    High,
    Low,
}

/// A level filter on one probe line. Edge conditions are not valid here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub line: ProbeLine,
    pub level: FilterLevel,
}

impl Filter {
    pub fn new(line: ProbeLine, level: FilterLevel) -> Self {
        Self { line, level }
    }
}

impl FromStr for Filter {
    type Err = TriggerError;

    /// Parses `"<line>:<level>"`, e.g. `"a0:hi"` or `"c7:lo"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, level) = s.split_once(':').ok_or_else(|| TriggerError::InvalidLine {
            input: s.to_string(),
        })?;
        let level = match level.parse::<TriggerKind>()? {
            TriggerKind::High => FilterLevel::High,
            TriggerKind::Low => FilterLevel::Low,
            _ => {
                return Err(TriggerError::InvalidFilterLevel {
                    input: s.to_string(),
                })
            }
        };
        Ok(Self {
            line: line.parse()?,
            level,
        })
    }
}

/// The set of trigger conditions armed for one capture.
///
/// Any number of level triggers may be armed, but the hardware has a single
/// edge detector, so at most one edge trigger is accepted.
#[derive(Debug, Clone, Default)]
pub struct TriggerSet {
    triggers: Vec<Trigger>,
    edge_armed: bool,
}

impl TriggerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, trigger: Trigger) -> Result<(), TriggerError> {
        if trigger.kind.is_edge() {
            if self.edge_armed {
                return Err(TriggerError::EdgeTriggerAlreadyArmed);
            }
            self.edge_armed = true;
        }
        self.triggers.push(trigger);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter()
    }
}
