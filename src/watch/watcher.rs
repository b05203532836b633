use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::sink::{Measurement, MetricsSink};
use crate::unit::UnitName;

use super::accumulate::Accumulator;
use super::collector::{Command, run_sampling_loop};
use super::observer::{FailurePolicy, StateObserver};
use super::segment::{SegmentError, segment_samples};

/// Measurement name under which per-unit state statistics are recorded.
pub const MEASUREMENT: &str = "service_config_state";
/// Tag key carrying the watched unit's name.
pub const RESOURCE_TAG: &str = "resource";

/// Default spacing between two state observations.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

/// Engine settings for one watched unit.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Spacing between two state observations.
    pub sample_interval: Duration,
    /// Upper bound on waiting for the sampling loop to answer a collect.
    pub collect_timeout: Duration,
    /// Treatment of failed observations.
    pub failure_policy: FailurePolicy,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::for_interval(DEFAULT_SAMPLE_INTERVAL)
    }
}

impl WatchConfig {
    /// Settings for the given sampling interval, with the collect timeout
    /// sized to cover a full loop iteration plus slack.
    pub fn for_interval(sample_interval: Duration) -> Self {
        Self {
            sample_interval,
            collect_timeout: sample_interval * 2 + Duration::from_secs(1),
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatherError {
    #[error("sampling has not been started")]
    NotRunning,
    #[error("sampling loop exited before answering")]
    LoopStopped,
    #[error("no batch delivered within {timeout:?}")]
    Timeout { timeout: Duration },
    #[error("failed to segment batch: {0}")]
    Segment(#[from] SegmentError),
    #[error("failed to record measurement: {0}")]
    Sink(#[source] crate::sink::Error),
}

/// Watches one systemd unit: samples its state in a background task and
/// folds collected batches into cumulative per-state statistics.
///
/// All engine state sits behind one async mutex, so collection cycles,
/// lifecycle changes and snapshots are serialized. The sampling task never
/// acquires the mutex; it is reached only through the command channel.
#[derive(Debug)]
pub struct Watcher {
    unit: UnitName,
    config: WatchConfig,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    accumulator: Accumulator,
    sampling: Option<SamplingHandle>,
}

#[derive(Debug)]
struct SamplingHandle {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

impl Watcher {
    pub fn new(unit: UnitName, config: WatchConfig) -> Self {
        Self {
            unit,
            config,
            inner: Mutex::new(Inner {
                accumulator: Accumulator::new(),
                sampling: None,
            }),
        }
    }

    pub fn unit(&self) -> &UnitName {
        &self.unit
    }

    /// Launches the sampling loop with the given observer.
    ///
    /// Returns `false` without touching anything if sampling is already
    /// running. Accumulated totals survive a stop/start sequence; only a
    /// new `Watcher` starts from scratch.
    pub async fn start<O>(&self, observer: O) -> bool
    where
        O: StateObserver + 'static,
    {
        let mut inner = self.inner.lock().await;
        if inner.sampling.is_some() {
            log::debug!("sampling for `{}` already running", self.unit);
            return false;
        }
        let (commands, rx) = mpsc::channel(1);
        let task = tokio::spawn(run_sampling_loop(
            observer,
            self.config.sample_interval,
            self.config.failure_policy,
            rx,
        ));
        inner.sampling = Some(SamplingHandle { commands, task });
        log::debug!("started sampling `{}`", self.unit);
        true
    }

    /// Terminates the sampling loop and waits for its task to finish.
    ///
    /// Returns `false` if sampling was not running.
    pub async fn stop(&self) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(handle) = inner.sampling.take() else {
            log::debug!("sampling for `{}` not running", self.unit);
            return false;
        };
        if handle.commands.send(Command::Terminate).await.is_err() {
            log::debug!("sampling loop for `{}` exited on its own", self.unit);
        }
        if let Err(err) = handle.task.await {
            log::error!("sampling task for `{}` panicked: {err}", self.unit);
        }
        log::debug!("stopped sampling `{}`", self.unit);
        true
    }

    /// Runs one collection cycle against the given sink.
    ///
    /// Requests the buffered batch from the sampling loop, segments it into
    /// intervals, folds those into the running totals and records the
    /// resulting measurement. A cycle that fails with
    /// [`SegmentError::InsufficientSamples`] leaves the totals untouched
    /// and records nothing; it resolves itself once more samples have
    /// accumulated.
    pub async fn gather<S: MetricsSink>(&self, sink: &S) -> Result<(), GatherError> {
        let mut inner = self.inner.lock().await;
        let commands = match &inner.sampling {
            Some(handle) => handle.commands.clone(),
            None => return Err(GatherError::NotRunning),
        };

        let timeout = self.config.collect_timeout;
        let (reply_tx, reply_rx) = oneshot::channel();
        let batch = tokio::time::timeout(timeout, async {
            commands
                .send(Command::Collect(reply_tx))
                .await
                .map_err(|_| GatherError::LoopStopped)?;
            reply_rx.await.map_err(|_| GatherError::LoopStopped)
        })
        .await
        .map_err(|_| GatherError::Timeout { timeout })??;

        log::trace!("collected {} samples for `{}`", batch.len(), self.unit);
        let intervals = segment_samples(&batch)?;
        inner.accumulator.fold(&intervals);

        let measurement = self.measurement(&inner.accumulator);
        sink.record(&measurement).await.map_err(GatherError::Sink)?;
        Ok(())
    }

    /// Returns the current measurement without running a collection cycle.
    pub async fn snapshot(&self) -> Measurement {
        let inner = self.inner.lock().await;
        self.measurement(&inner.accumulator)
    }

    fn measurement(&self, accumulator: &Accumulator) -> Measurement {
        Measurement {
            name: MEASUREMENT.to_owned(),
            fields: accumulator.fields(),
            tags: HashMap::from([(RESOURCE_TAG.to_owned(), self.unit.to_string())]),
        }
    }
}
