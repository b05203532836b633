/// Entry point for the statewatch unit monitoring agent.
///
/// This binary samples the activation state of the configured systemd units,
/// folds the samples into cumulative per-state statistics, and records them
/// as InfluxDB line protocol. It also starts an API server for querying the
/// running totals.
///
/// # Errors
///
/// Returns an error if initialization fails (e.g., missing environment
/// variables or an unwritable output file).
///
/// # Examples
///
/// ```bash
/// STATEWATCH_UNITS=nginx.service,redis.service cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    statewatch::run().await
}
