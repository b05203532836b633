use super::sample::Sample;

/// Source of state observations for a single monitored unit.
///
/// Implementations probe the resource once per call and stamp the result
/// with a monotonic timestamp. [`observe`] must return promptly relative to
/// the sampling interval; the sampling loop awaits it before anything else.
///
/// [`observe`]: StateObserver::observe
pub trait StateObserver: Send {
    type Error: std::error::Error + Send;

    /// Probes the resource's current named state.
    fn observe(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Sample, Self::Error>> + Send;
}

/// How the sampling loop treats a failed observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the reserved `unknown` state and keep sampling.
    #[default]
    RecordUnknown,
    /// Terminate the sampling loop; the next collection fails.
    Halt,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown observe failure policy `{0}`, expected `record-unknown` or `halt`")]
pub struct ParseFailurePolicyError(String);

impl std::str::FromStr for FailurePolicy {
    type Err = ParseFailurePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "record-unknown" => Ok(Self::RecordUnknown),
            "halt" => Ok(Self::Halt),
            other => Err(ParseFailurePolicyError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_failure_policies() {
        assert_eq!(
            "record-unknown".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::RecordUnknown
        );
        assert_eq!("halt".parse::<FailurePolicy>().unwrap(), FailurePolicy::Halt);
        assert!("retry".parse::<FailurePolicy>().is_err());
    }
}
