//! Domain layer with core entities, errors, and port definitions.

/// Availability states and probe outcomes.
pub mod availability;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use availability::{AvailabilityState, ProbeOutcome};
pub use entities::{CandidateDescriptor, CdnEndpoint, ImageRole, ParamValue, ParameterSet, ResponsiveSet};
pub use errors::{ParamError, ProbeError};
pub use ports::{CacheStats, ProbePort, UrlCachePort};
