use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::unit::UnitName;
use crate::watch::{Sample, StateObserver, monotonic_nanos};

use super::parser;
use super::{Error, Result};

/// Property queried for every sample.
pub const ACTIVE_STATE_PROPERTY: &str = "ActiveState";

/// Upper bound on a single `systemctl show` invocation.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Observes a unit's `ActiveState` by running `systemctl show`.
#[derive(Debug, Clone)]
pub struct SystemctlObserver {
    unit: UnitName,
    timeout: Duration,
}

impl SystemctlObserver {
    pub fn new(unit: UnitName) -> Self {
        Self {
            unit,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(unit: UnitName, timeout: Duration) -> Self {
        Self { unit, timeout }
    }

    /// Runs `systemctl show <unit> --property=ActiveState` and extracts the
    /// reported state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Launch`] if the process cannot be spawned,
    /// [`Error::Timeout`] if it does not finish in time, [`Error::Failed`]
    /// for a non-zero exit and [`Error::MissingProperty`] if the output
    /// carries no usable `ActiveState` value.
    async fn probe(&self) -> Result<String> {
        let output = Command::new("systemctl")
            .arg("show")
            .arg(self.unit.as_ref())
            .arg(format!("--property={ACTIVE_STATE_PROPERTY}"))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| Error::Timeout {
                unit: self.unit.to_string(),
                timeout: self.timeout,
            })?
            .map_err(|source| Error::Launch {
                unit: self.unit.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::Failed {
                unit: self.unit.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parser::property_value(&stdout, ACTIVE_STATE_PROPERTY)
            .map(str::to_owned)
            .ok_or_else(|| Error::MissingProperty {
                unit: self.unit.to_string(),
                property: ACTIVE_STATE_PROPERTY.to_owned(),
            })
    }
}

impl StateObserver for SystemctlObserver {
    type Error = Error;

    async fn observe(&mut self) -> Result<Sample> {
        let state = self.probe().await?;
        Ok(Sample::new(state, monotonic_nanos()))
    }
}
