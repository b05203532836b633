use super::sample::{Sample, StateInterval};

#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("need at least 2 samples to derive state intervals, got {got}")]
    InsufficientSamples { got: usize },
}

/// Derives the state intervals covered by one ordered batch of samples.
///
/// Walks the batch in order, closing an interval at every state transition;
/// the span still open after the last sample is closed with the remaining
/// time. When the final sample itself is a transition the returned list
/// ends with a zero-duration interval for the state just entered; its real
/// duration is measured by the next batch, which starts with a copy of that
/// sample.
///
/// # Errors
///
/// Returns [`SegmentError::InsufficientSamples`] if fewer than two samples
/// are supplied, as a single sample cannot bound an interval.
pub fn segment_samples(samples: &[Sample]) -> Result<Vec<StateInterval>, SegmentError> {
    if samples.len() < 2 {
        return Err(SegmentError::InsufficientSamples {
            got: samples.len(),
        });
    }

    let mut intervals = Vec::new();
    let mut current = samples[0].name();
    let mut start = samples[0].timestamp();
    for sample in &samples[1..] {
        if sample.name() != current {
            intervals.push(StateInterval::new(
                current,
                sample.timestamp().saturating_sub(start),
            ));
            start = sample.timestamp();
            current = sample.name();
        }
    }

    let end = samples[samples.len() - 1].timestamp();
    intervals.push(StateInterval::new(current, end.saturating_sub(start)));

    Ok(intervals)
}
