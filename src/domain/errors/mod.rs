//! Domain error types.

mod param_error;
mod probe_error;

pub use param_error::ParamError;
pub use probe_error::ProbeError;
