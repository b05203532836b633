use std::sync::Arc;
use std::time::Duration;

/// Statewatch: a systemd unit monitoring agent that samples unit activation
/// states via `systemctl` and folds them into cumulative per-state
/// statistics.
///
/// This library provides the core functionality for sampling unit states in
/// background tasks, deriving state intervals from collected batches,
/// recording the running totals as line protocol measurements and exposing
/// them via an API.
pub mod api;
pub mod config;
pub mod sink;
pub mod systemd;
pub mod unit;
pub mod watch;

use sink::MetricsSink;

/// Runs the statewatch agent.
///
/// Reads the configuration from the environment, launches one sampling task
/// per configured unit, serves the export API and records one measurement
/// per unit at the configured gather interval until `SIGINT`.
///
/// # Returns
///
/// Returns `Ok(())` after a clean shutdown, or an error if any component
/// fails to start.
///
/// # Errors
///
/// Possible errors include:
/// - Missing or invalid environment variables (e.g., `STATEWATCH_UNITS`).
/// - Failure to open the measurement output file.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env()?;

    let registry = Arc::new(watch::Registry::default());
    let watch_config = config.watch_config();
    for unit in &config.units {
        let watcher = Arc::new(watch::Watcher::new(unit.clone(), watch_config.clone()));
        watcher.start(systemd::SystemctlObserver::new(unit.clone())).await;
        registry.register(watcher);
    }
    log::debug!("Started sampling {} units", registry.size());

    {
        let registry = Arc::clone(&registry);
        let addr = config.listen_addr.clone();
        tokio::spawn(async move {
            let api = api::APIServer::new(registry).await;
            api.listen(addr).await
        });
    }

    match &config.output {
        config::Output::Stdout => {
            let sink = sink::LineProtocolSink::stdout();
            gather_until_shutdown(&registry, &sink, config.gather_interval).await;
        }
        config::Output::File(path) => {
            let sink = sink::LineProtocolSink::append_to(path).await?;
            gather_until_shutdown(&registry, &sink, config.gather_interval).await;
        }
    }

    for watcher in registry.watchers() {
        watcher.stop().await;
    }
    log::debug!("Stopped all sampling tasks");
    Ok(())
}

/// Records one measurement per unit every `every` until `SIGINT` arrives.
async fn gather_until_shutdown<S: MetricsSink>(
    registry: &watch::Registry,
    sink: &S,
    every: Duration,
) {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut interval = tokio::time::interval(every);
    // the first tick fires immediately; that cycle usually holds a single
    // sample and is skipped as insufficient
    loop {
        tokio::select! {
            _ = interval.tick() => registry.gather_all(sink).await,
            result = &mut shutdown => {
                if let Err(err) = result {
                    log::error!("failed to listen for shutdown signal: {}", err);
                }
                log::debug!("Shutting down");
                return;
            }
        }
    }
}
