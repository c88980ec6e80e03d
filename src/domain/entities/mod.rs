//! Domain entity definitions.

mod candidate;
mod cdn_endpoint;
mod image_role;
mod parameter_set;

pub use candidate::{CandidateDescriptor, ResponsiveSet};
pub use cdn_endpoint::{CdnEndpoint, PROBE_PIXELS};
pub use image_role::ImageRole;
pub use parameter_set::{ParamValue, ParameterSet};
