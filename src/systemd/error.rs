use std::process::ExitStatus;
use std::time::Duration;

/// Errors that may occur while probing a unit's state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to run systemctl for `{unit}`: {source}")]
    Launch {
        unit: String,
        #[source]
        source: std::io::Error,
    },
    #[error("systemctl gave no answer for `{unit}` within {timeout:?}")]
    Timeout { unit: String, timeout: Duration },
    #[error("systemctl failed for `{unit}` ({status}): {stderr}")]
    Failed {
        unit: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("systemctl output for `{unit}` is missing the `{property}` property")]
    MissingProperty { unit: String, property: String },
}

pub type Result<T> = std::result::Result<T, Error>;
