use std::sync::OnceLock;
use std::time::Instant;

/// Reserved state name reported before the first successful observation and
/// recorded in place of failed observations.
pub const UNKNOWN_STATE: &str = "unknown";

/// Nanoseconds elapsed since the first call in this process.
///
/// Readings are monotonically non-decreasing, which sample timestamps
/// require and wall-clock readings cannot guarantee.
pub fn monotonic_nanos() -> u64 {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// A single timestamped observation of a unit's named state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    name: String,
    /// Timestamp (in monotonic nanoseconds)
    timestamp: u64,
}

impl Sample {
    pub fn new(name: impl Into<String>, timestamp: u64) -> Self {
        Self {
            name: name.into(),
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// A span of time during which the observed state stayed constant.
///
/// Produced only by segmentation. A duration of zero marks an interval that
/// opened with the batch's final sample and has not been measured yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateInterval {
    name: String,
    /// Duration (in nanoseconds)
    duration: u64,
}

impl StateInterval {
    pub fn new(name: impl Into<String>, duration: u64) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }
}
