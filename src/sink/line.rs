use std::time::{SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use super::models::{FieldValue, Measurement};
use super::{Error, MetricsSink, Result};

/// Writes measurements as InfluxDB line protocol, one line each.
///
/// Lines take the shape
/// `service_config_state,resource=nginx.service active_dur=12u,current_state="active" <ns>`
/// with tags and fields in lexicographic order and wall-clock nanosecond
/// timestamps stamped at record time.
#[derive(Debug)]
pub struct LineProtocolSink<W> {
    out: Mutex<W>,
}

impl LineProtocolSink<tokio::io::Stdout> {
    /// A sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl LineProtocolSink<tokio::fs::File> {
    /// A sink appending to the file at `path`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OpenError`] if the file cannot be opened.
    pub async fn append_to(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(Error::OpenError)?;
        Ok(Self::new(file))
    }
}

impl<W: AsyncWrite + Unpin + Send> LineProtocolSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W: AsyncWrite + Unpin + Send> MetricsSink for LineProtocolSink<W> {
    async fn record(&self, measurement: &Measurement) -> Result<()> {
        let mut line = render(measurement, wallclock_nanos());
        line.push('\n');
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(Error::WriteError)?;
        out.flush().await.map_err(Error::WriteError)
    }
}

fn wallclock_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}

/// Renders one line-protocol line without the trailing newline.
fn render(measurement: &Measurement, timestamp: u64) -> String {
    let mut line = escape_name(&measurement.name);

    let mut tags: Vec<_> = measurement.tags.iter().collect();
    tags.sort_unstable();
    for (key, value) in tags {
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    line.push(' ');
    let mut fields: Vec<_> = measurement.fields.iter().collect();
    fields.sort_unstable_by_key(|(key, _)| key.as_str());
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_key(key));
        line.push('=');
        match value {
            FieldValue::UInteger(v) => {
                line.push_str(&v.to_string());
                line.push('u');
            }
            FieldValue::Text(v) => {
                line.push('"');
                line.push_str(&escape_text(v));
                line.push('"');
            }
        }
    }

    line.push(' ');
    line.push_str(&timestamp.to_string());
    line
}

/// Escapes commas and spaces in a measurement name.
fn escape_name(name: &str) -> String {
    name.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escapes commas, equals signs and spaces in tag keys, tag values and
/// field keys.
fn escape_key(key: &str) -> String {
    key.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// Escapes backslashes and double quotes in string field values.
fn escape_text(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
