use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::sink::{FieldValue, MetricsSink};
use crate::unit::UnitName;

use super::watcher::{GatherError, Watcher};

/// Tracks the independent per-unit watchers.
///
/// Each watcher samples exactly one unit; fan-out across units lives here.
#[derive(Debug, Default)]
pub struct Registry {
    watchers: DashMap<UnitName, Arc<Watcher>>,
}

impl Registry {
    /// Registers a watcher under its unit name, replacing any previous one.
    pub fn register(&self, watcher: Arc<Watcher>) {
        self.watchers.insert(watcher.unit().clone(), watcher);
    }

    pub fn remove(&self, unit: &str) -> Option<Arc<Watcher>> {
        self.watchers.remove(unit).map(|(_, watcher)| watcher)
    }

    pub fn get(&self, unit: &str) -> Option<Arc<Watcher>> {
        self.watchers
            .get(unit)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn size(&self) -> usize {
        self.watchers.len()
    }

    /// Clones the current set of watchers out of the map.
    ///
    /// Callers iterate the clone, so no shard lock is held across await
    /// points.
    pub fn watchers(&self) -> Vec<Arc<Watcher>> {
        self.watchers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Runs one collection cycle on every registered watcher.
    ///
    /// Failures are logged and never remove a watcher: units come from
    /// configuration, and an insufficient-samples cycle resolves itself
    /// once enough samples have accumulated.
    pub async fn gather_all<S: MetricsSink>(&self, sink: &S) {
        for watcher in self.watchers() {
            match watcher.gather(sink).await {
                Ok(()) => {}
                Err(err @ GatherError::Segment(_)) => {
                    log::debug!(
                        target: "unit watcher",
                        "skipping `{}` this cycle: {}",
                        watcher.unit(),
                        err
                    );
                }
                Err(err) => {
                    log::error!(
                        target: "unit watcher",
                        "failed to gather `{}`: {}",
                        watcher.unit(),
                        err
                    );
                }
            }
        }
    }

    /// Returns every watcher's current field map, keyed by unit name.
    pub async fn snapshot_all(&self) -> HashMap<String, HashMap<String, FieldValue>> {
        let mut out = HashMap::with_capacity(self.size());
        for watcher in self.watchers() {
            let measurement = watcher.snapshot().await;
            out.insert(watcher.unit().to_string(), measurement.fields);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::time::Duration;

    use super::*;
    use crate::sink::{self, Measurement};
    use crate::watch::sample::Sample;
    use crate::watch::{CURRENT_STATE_FIELD, StateObserver, WatchConfig};

    #[derive(Default)]
    struct RecordingSink {
        recorded: std::sync::Mutex<Vec<Measurement>>,
    }

    impl MetricsSink for RecordingSink {
        async fn record(&self, measurement: &Measurement) -> sink::Result<()> {
            self.recorded.lock().unwrap().push(measurement.clone());
            Ok(())
        }
    }

    struct SteadyObserver {
        tick: u64,
    }

    impl StateObserver for SteadyObserver {
        type Error = Infallible;

        async fn observe(&mut self) -> Result<Sample, Infallible> {
            self.tick += 1;
            Ok(Sample::new("active", self.tick * 2))
        }
    }

    fn watcher(unit: &str) -> Arc<Watcher> {
        Arc::new(Watcher::new(
            UnitName::new(unit).unwrap(),
            WatchConfig::for_interval(Duration::from_millis(5)),
        ))
    }

    #[tokio::test]
    async fn registers_and_looks_up_watchers() {
        let registry = Registry::default();
        assert_eq!(registry.size(), 0);
        registry.register(watcher("a.service"));
        registry.register(watcher("b.service"));
        assert_eq!(registry.size(), 2);
        assert!(registry.get("a.service").is_some());
        assert!(registry.get("c.service").is_none());
        assert!(registry.remove("a.service").is_some());
        assert_eq!(registry.size(), 1);
    }

    #[tokio::test]
    async fn gather_all_keeps_failing_watchers_registered() {
        let registry = Registry::default();
        let running = watcher("up.service");
        running.start(SteadyObserver { tick: 0 }).await;
        registry.register(Arc::clone(&running));
        // never started, every gather fails
        registry.register(watcher("stopped.service"));

        tokio::time::sleep(Duration::from_millis(30)).await;
        let sink = RecordingSink::default();
        registry.gather_all(&sink).await;

        assert_eq!(registry.size(), 2);
        assert_eq!(sink.recorded.lock().unwrap().len(), 1);
        running.stop().await;
    }

    #[tokio::test]
    async fn snapshot_all_returns_fields_per_unit() {
        let registry = Registry::default();
        registry.register(watcher("one.service"));
        registry.register(watcher("two.service"));
        let snapshots = registry.snapshot_all().await;
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots["one.service"].contains_key(CURRENT_STATE_FIELD));
        assert!(snapshots["two.service"].contains_key(CURRENT_STATE_FIELD));
    }
}
