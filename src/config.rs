use std::path::PathBuf;
use std::time::Duration;

use crate::unit::UnitName;
use crate::watch::{DEFAULT_SAMPLE_INTERVAL, FailurePolicy, WatchConfig};

/// Environment variable naming the units to watch (comma separated).
pub const UNITS_VAR: &str = "STATEWATCH_UNITS";
/// Environment variable overriding the sampling interval in seconds.
pub const SAMPLE_INTERVAL_VAR: &str = "STATEWATCH_SAMPLE_INTERVAL";
/// Environment variable overriding the gather interval in seconds.
pub const GATHER_INTERVAL_VAR: &str = "STATEWATCH_GATHER_INTERVAL";
/// Environment variable overriding the export API bind address.
pub const LISTEN_ADDR_VAR: &str = "STATEWATCH_LISTEN_ADDR";
/// Environment variable selecting the observation failure policy
/// (`record-unknown` or `halt`).
pub const FAILURE_POLICY_VAR: &str = "STATEWATCH_ON_OBSERVE_FAILURE";
/// Environment variable selecting the measurement output (`stdout` or a
/// file path).
pub const OUTPUT_VAR: &str = "STATEWATCH_OUTPUT";

const DEFAULT_GATHER_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Errors that may occur while reading the agent configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("environment variable `{name}` is not set")]
    MissingVar { name: &'static str },
    #[error("`{name}` lists no units")]
    NoUnits { name: &'static str },
    #[error("`{name}` lists `{unit}` twice")]
    DuplicateUnit { name: &'static str, unit: String },
    #[error("invalid unit name in `{name}`: {source}")]
    InvalidUnit {
        name: &'static str,
        #[source]
        source: crate::unit::Error,
    },
    #[error("invalid value `{value}` for `{name}`: {source}")]
    InvalidInterval {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("`{name}` must be at least 1 second")]
    ZeroInterval { name: &'static str },
    #[error("invalid value for `{name}`: {source}")]
    InvalidPolicy {
        name: &'static str,
        #[source]
        source: crate::watch::ParseFailurePolicyError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Where recorded measurements go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

/// Agent configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub units: Vec<UnitName>,
    pub sample_interval: Duration,
    pub gather_interval: Duration,
    pub listen_addr: String,
    pub failure_policy: FailurePolicy,
    pub output: Output,
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `STATEWATCH_UNITS` is unset, empty or lists an
    /// invalid or duplicate unit name, or if any override carries a value
    /// that does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through the given variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw_units = lookup(UNITS_VAR).ok_or(Error::MissingVar { name: UNITS_VAR })?;
        let mut units = Vec::new();
        for raw in raw_units
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
        {
            let unit = UnitName::new(raw).map_err(|source| Error::InvalidUnit {
                name: UNITS_VAR,
                source,
            })?;
            if units.contains(&unit) {
                return Err(Error::DuplicateUnit {
                    name: UNITS_VAR,
                    unit: raw.to_owned(),
                });
            }
            units.push(unit);
        }
        if units.is_empty() {
            return Err(Error::NoUnits { name: UNITS_VAR });
        }

        let sample_interval = interval_from(&lookup, SAMPLE_INTERVAL_VAR, DEFAULT_SAMPLE_INTERVAL)?;
        let gather_interval = interval_from(&lookup, GATHER_INTERVAL_VAR, DEFAULT_GATHER_INTERVAL)?;

        let listen_addr = lookup(LISTEN_ADDR_VAR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());

        let failure_policy = match lookup(FAILURE_POLICY_VAR) {
            Some(raw) => raw.parse().map_err(|source| Error::InvalidPolicy {
                name: FAILURE_POLICY_VAR,
                source,
            })?,
            None => FailurePolicy::default(),
        };

        let output = match lookup(OUTPUT_VAR) {
            None => Output::Stdout,
            Some(raw) if raw == "stdout" => Output::Stdout,
            Some(raw) => Output::File(PathBuf::from(raw)),
        };

        Ok(Self {
            units,
            sample_interval,
            gather_interval,
            listen_addr,
            failure_policy,
            output,
        })
    }

    /// Engine settings derived from the agent configuration.
    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            failure_policy: self.failure_policy,
            ..WatchConfig::for_interval(self.sample_interval)
        }
    }
}

fn interval_from(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Duration,
) -> Result<Duration> {
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|source| Error::InvalidInterval {
            name,
            value: raw.clone(),
            source,
        })?;
    if secs == 0 {
        return Err(Error::ZeroInterval { name });
    }
    Ok(Duration::from_secs(secs))
}
