//! State sampling and aggregation for systemd units.
//!
//! A [`Watcher`] owns the full pipeline for one unit: a background sampling
//! loop appends timestamped state observations to a private buffer, a
//! collection cycle drains that buffer through a two-message command
//! protocol, segments the batch into per-state intervals and folds them
//! into cumulative totals, recorded as one measurement per cycle.
//!
//! # Key Components
//!
//! - [`StateObserver`]: probes the resource's current named state.
//! - [`Watcher`]: per-unit orchestrator holding the lifecycle, collection
//!   cycles and snapshots.
//! - [`Registry`]: the set of independent watchers driven by the agent.
//! - [`segment_samples`] / [`Accumulator`]: the pure aggregation core.
//!
//! # Continuity
//!
//! Each collected batch leaves its final sample behind as the start of the
//! next batch, and the accumulator carries the currently open interval
//! across cycles, so a state spanning several cycles is counted as one
//! visit whose duration keeps growing.
mod accumulate;
mod collector;
mod observer;
mod registry;
mod sample;
mod segment;
mod watcher;

pub use accumulate::{
    Accumulator, COUNT_FIELD_SUFFIX, CURRENT_STATE_FIELD, CURRENT_STATE_TIME_FIELD,
    DUR_FIELD_SUFFIX, StateTotals,
};
pub use observer::{FailurePolicy, ParseFailurePolicyError, StateObserver};
pub use registry::Registry;
pub use sample::{Sample, StateInterval, UNKNOWN_STATE, monotonic_nanos};
pub use segment::{SegmentError, segment_samples};
pub use watcher::{
    DEFAULT_SAMPLE_INTERVAL, GatherError, MEASUREMENT, RESOURCE_TAG, WatchConfig, Watcher,
};
