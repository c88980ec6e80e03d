//! CDN availability states and probe outcomes.

use super::errors::ProbeError;

/// Where the availability probe currently stands.
///
/// `Available` and `Unavailable` are terminal for the lifetime of a prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvailabilityState {
    /// No probe has been started.
    #[default]
    Unknown,
    /// A probe is in flight.
    Checking,
    /// The CDN answered.
    Available,
    /// The CDN failed or timed out.
    Unavailable,
}

impl AvailabilityState {
    /// Returns true once the probe has settled.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Available | Self::Unavailable)
    }

    /// Returns true only when CDN URLs may be emitted.
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Checking => write!(f, "checking"),
            Self::Available => write!(f, "available"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Settled result of a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// CDN responded.
    Available,
    /// CDN did not respond in time or failed.
    Unavailable(ProbeError),
}

impl ProbeOutcome {
    /// Terminal state corresponding to this outcome.
    #[must_use]
    pub const fn state(&self) -> AvailabilityState {
        match self {
            Self::Available => AvailabilityState::Available,
            Self::Unavailable(_) => AvailabilityState::Unavailable,
        }
    }

    /// Why the CDN is unavailable, if it is.
    #[must_use]
    pub const fn reason(&self) -> Option<&ProbeError> {
        match self {
            Self::Available => None,
            Self::Unavailable(reason) => Some(reason),
        }
    }
}

impl From<Result<(), ProbeError>> for ProbeOutcome {
    fn from(result: Result<(), ProbeError>) -> Self {
        match result {
            Ok(()) => Self::Available,
            Err(e) => Self::Unavailable(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!AvailabilityState::Unknown.is_terminal());
        assert!(!AvailabilityState::Checking.is_terminal());
        assert!(AvailabilityState::Available.is_terminal());
        assert!(AvailabilityState::Unavailable.is_terminal());
    }

    #[test]
    fn test_outcome_from_result() {
        let outcome = ProbeOutcome::from(Err(ProbeError::network("refused")));
        assert_eq!(outcome.state(), AvailabilityState::Unavailable);
        assert!(outcome.reason().is_some());
        assert_eq!(ProbeOutcome::from(Ok(())).state(), AvailabilityState::Available);
    }
}
