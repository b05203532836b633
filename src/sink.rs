mod error;
mod line;
mod models;
mod recorder;

pub use error::{Error, Result};
pub use line::LineProtocolSink;
pub use models::{FieldValue, Measurement};
pub use recorder::MetricsSink;
