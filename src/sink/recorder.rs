use super::Result;
use super::models::Measurement;

/// Destination for recorded measurements.
pub trait MetricsSink {
    /// Records one measurement.
    fn record(
        &self,
        measurement: &Measurement,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
