//! Availability probe error types.

use std::time::Duration;

use thiserror::Error;

/// Reasons a CDN availability probe can fail.
///
/// Both variants collapse into [`AvailabilityState::Unavailable`] for
/// consumers; the distinction is kept for logging only.
///
/// [`AvailabilityState::Unavailable`]: crate::domain::AvailabilityState::Unavailable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ProbeError {
    #[error("probe did not settle within {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("CDN unreachable: {message}")]
    NetworkFailure { message: String },
}

impl ProbeError {
    /// Creates a timeout error for the given deadline.
    #[must_use]
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout {
            after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Creates a network failure error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            message: message.into(),
        }
    }

    /// Returns whether the probe ran out of time.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
