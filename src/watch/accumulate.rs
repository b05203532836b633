use std::collections::HashMap;

use crate::sink::FieldValue;

use super::sample::{StateInterval, UNKNOWN_STATE};

/// Suffix appended to a state name to form its total-duration field key.
pub const DUR_FIELD_SUFFIX: &str = "_dur";
/// Suffix appended to a state name to form its visit-count field key.
pub const COUNT_FIELD_SUFFIX: &str = "_count";
/// Field key carrying the name of the currently open state interval.
pub const CURRENT_STATE_FIELD: &str = "current_state";
/// Field key carrying the duration accrued so far in the open interval.
pub const CURRENT_STATE_TIME_FIELD: &str = "current_state_time";

/// Cumulative totals for one observed state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateTotals {
    duration: u64,
    visits: u64,
}

impl StateTotals {
    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn visits(&self) -> u64 {
        self.visits
    }
}

/// Folds per-batch state intervals into cumulative per-state statistics.
///
/// Tracks the currently open interval (name and accrued duration) across
/// batches, so a state spanning several collection cycles is counted as a
/// single visit whose duration keeps growing. Totals never decrease.
#[derive(Debug)]
pub struct Accumulator {
    totals: HashMap<String, StateTotals>,
    current_state: String,
    current_state_duration: u64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            totals: HashMap::new(),
            current_state: UNKNOWN_STATE.to_owned(),
            current_state_duration: 0,
        }
    }

    /// Folds one batch worth of intervals into the running totals.
    ///
    /// A single-interval batch continues the open interval: the open
    /// duration grows and no visit is counted; a state seen for the first
    /// time is seeded with one visit at the extended duration. A batch with
    /// transitions restarts the open duration at the final interval's
    /// duration (zero for a trailing transition) and credits every interval
    /// to its state's totals, one visit each.
    pub fn fold(&mut self, intervals: &[StateInterval]) {
        let Some(last) = intervals.last() else {
            return;
        };

        if intervals.len() == 1 {
            self.current_state_duration += last.duration();
            if !self.totals.contains_key(last.name()) {
                self.totals.insert(
                    last.name().to_owned(),
                    StateTotals {
                        duration: self.current_state_duration,
                        visits: 1,
                    },
                );
            }
        } else {
            self.current_state_duration = last.duration();
            for interval in intervals {
                let totals = self.totals.entry(interval.name().to_owned()).or_default();
                totals.duration += interval.duration();
                totals.visits += 1;
            }
        }

        self.current_state = last.name().to_owned();
    }

    /// Returns the name of the currently open state interval.
    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    /// Returns the duration accrued so far in the open interval.
    pub fn current_state_duration(&self) -> u64 {
        self.current_state_duration
    }

    pub fn totals(&self) -> &HashMap<String, StateTotals> {
        &self.totals
    }

    /// Renders the flat field map emitted with each measurement:
    /// `current_state`, `current_state_time` and a `<state>_dur` /
    /// `<state>_count` pair per tracked state.
    pub fn fields(&self) -> HashMap<String, FieldValue> {
        let mut fields = HashMap::with_capacity(2 + 2 * self.totals.len());
        fields.insert(
            CURRENT_STATE_FIELD.to_owned(),
            FieldValue::Text(self.current_state.clone()),
        );
        fields.insert(
            CURRENT_STATE_TIME_FIELD.to_owned(),
            FieldValue::UInteger(self.current_state_duration),
        );
        for (name, totals) in &self.totals {
            fields.insert(
                format!("{name}{DUR_FIELD_SUFFIX}"),
                FieldValue::UInteger(totals.duration),
            );
            fields.insert(
                format!("{name}{COUNT_FIELD_SUFFIX}"),
                FieldValue::UInteger(totals.visits),
            );
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intervals(raw: &[(&str, u64)]) -> Vec<StateInterval> {
        raw.iter()
            .map(|(name, duration)| StateInterval::new(*name, *duration))
            .collect()
    }

    fn accumulator_with_open_interval(state: &str, duration: u64) -> Accumulator {
        Accumulator {
            totals: HashMap::new(),
            current_state: state.to_owned(),
            current_state_duration: duration,
        }
    }

    #[test]
    fn starts_in_unknown_state() {
        let acc = Accumulator::new();
        assert_eq!(acc.current_state(), UNKNOWN_STATE);
        assert_eq!(acc.current_state_duration(), 0);
        assert!(acc.totals().is_empty());
    }

    #[test]
    fn empty_fold_is_a_no_op() {
        let mut acc = Accumulator::new();
        acc.fold(&[]);
        assert_eq!(acc.current_state(), UNKNOWN_STATE);
        assert!(acc.totals().is_empty());
    }

    #[test]
    fn continuation_extends_open_interval() {
        let mut acc = accumulator_with_open_interval("active", 10);
        acc.fold(&intervals(&[("active", 2)]));
        assert_eq!(acc.current_state(), "active");
        assert_eq!(acc.current_state_duration(), 12);
        assert_eq!(
            acc.totals()["active"],
            StateTotals {
                duration: 12,
                visits: 1
            }
        );
    }

    #[test]
    fn continuation_never_adds_a_visit() {
        let mut acc = Accumulator::new();
        acc.fold(&intervals(&[("active", 10)]));
        acc.fold(&intervals(&[("active", 2)]));
        assert_eq!(acc.current_state_duration(), 12);
        // the seeded snapshot stays put until the next transition
        assert_eq!(
            acc.totals()["active"],
            StateTotals {
                duration: 10,
                visits: 1
            }
        );
    }

    #[test]
    fn trailing_transition_restarts_open_duration_at_zero() {
        let mut acc = accumulator_with_open_interval("active", 8);
        acc.fold(&intervals(&[("active", 2), ("failed", 0)]));
        assert_eq!(acc.current_state(), "failed");
        assert_eq!(acc.current_state_duration(), 0);
        assert_eq!(
            acc.totals()["active"],
            StateTotals {
                duration: 2,
                visits: 1
            }
        );
        assert_eq!(
            acc.totals()["failed"],
            StateTotals {
                duration: 0,
                visits: 1
            }
        );
    }

    #[test]
    fn zero_duration_visit_is_measured_by_the_next_cycle() {
        let mut acc = accumulator_with_open_interval("active", 8);
        acc.fold(&intervals(&[("active", 2), ("failed", 0)]));
        assert_eq!(acc.current_state_duration(), 0);

        // the visit that opened at the batch boundary gets its duration
        // once a later sample closes it
        acc.fold(&intervals(&[("failed", 4), ("active", 0)]));
        assert_eq!(acc.totals()["failed"].duration(), 4);
        assert_eq!(acc.current_state(), "active");
        assert_eq!(acc.current_state_duration(), 0);
    }

    #[test]
    fn multi_transition_batch_credits_each_occurrence() {
        let mut acc = accumulator_with_open_interval("active", 2);
        acc.fold(&intervals(&[
            ("active", 4),
            ("inactive", 2),
            ("active", 2),
            ("failed", 2),
            ("inactive", 0),
        ]));
        assert_eq!(acc.current_state(), "inactive");
        assert_eq!(acc.current_state_duration(), 0);
        assert_eq!(
            acc.totals()["active"],
            StateTotals {
                duration: 6,
                visits: 2
            }
        );
        assert_eq!(
            acc.totals()["inactive"],
            StateTotals {
                duration: 2,
                visits: 2
            }
        );
        assert_eq!(
            acc.totals()["failed"],
            StateTotals {
                duration: 2,
                visits: 1
            }
        );
    }

    #[test]
    fn alternating_states_accumulate_across_visits() {
        let mut acc = accumulator_with_open_interval("active", 4);
        acc.fold(&intervals(&[
            ("active", 2),
            ("inactive", 2),
            ("failed", 2),
            ("active", 2),
            ("inactive", 2),
            ("failed", 0),
        ]));
        assert_eq!(acc.current_state(), "failed");
        assert_eq!(acc.current_state_duration(), 0);
        assert_eq!(
            acc.totals()["active"],
            StateTotals {
                duration: 4,
                visits: 2
            }
        );
        assert_eq!(
            acc.totals()["inactive"],
            StateTotals {
                duration: 4,
                visits: 2
            }
        );
        assert_eq!(
            acc.totals()["failed"],
            StateTotals {
                duration: 2,
                visits: 2
            }
        );
    }

    #[test]
    fn totals_never_decrease_across_cycles() {
        let batches = [
            vec![("active", 4)],
            vec![("active", 2), ("failed", 0)],
            vec![("failed", 6)],
            vec![("failed", 2), ("active", 4), ("failed", 0)],
            vec![("failed", 10)],
        ];
        let mut acc = Accumulator::new();
        let mut seen: HashMap<String, StateTotals> = HashMap::new();
        for batch in &batches {
            acc.fold(&intervals(batch));
            for (name, totals) in acc.totals() {
                let prev = seen.entry(name.clone()).or_default();
                assert!(totals.duration() >= prev.duration(), "{name} duration shrank");
                assert!(totals.visits() >= prev.visits(), "{name} visits shrank");
                *prev = *totals;
            }
        }
    }

    #[test]
    fn fields_render_suffixed_keys() {
        let mut acc = Accumulator::new();
        acc.fold(&intervals(&[("active", 2), ("failed", 0)]));
        let fields = acc.fields();
        assert_eq!(
            fields[CURRENT_STATE_FIELD],
            FieldValue::Text("failed".to_owned())
        );
        assert_eq!(fields[CURRENT_STATE_TIME_FIELD], FieldValue::UInteger(0));
        assert_eq!(fields["active_dur"], FieldValue::UInteger(2));
        assert_eq!(fields["active_count"], FieldValue::UInteger(1));
        assert_eq!(fields["failed_dur"], FieldValue::UInteger(0));
        assert_eq!(fields["failed_count"], FieldValue::UInteger(1));
        assert_eq!(fields.len(), 6);
    }
}
