//! Parameter parsing error types.

use thiserror::Error;

/// Errors raised while parsing caller-supplied parameter overrides.
///
/// Never fatal: callers discard the malformed override and keep the
/// catalog defaults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ParamError {
    #[error("invalid override format: {reason}")]
    InvalidOverrideFormat { reason: String },
}

impl ParamError {
    /// Creates an invalid override error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidOverrideFormat {
            reason: reason.into(),
        }
    }
}
