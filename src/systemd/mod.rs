//! Unit state observation through `systemctl`.
mod error;
mod observer;
mod parser;

pub use error::{Error, Result};
pub use observer::{ACTIVE_STATE_PROPERTY, DEFAULT_PROBE_TIMEOUT, SystemctlObserver};
pub use parser::property_value;
