//! Core services: catalog, probe, URL building, responsive sets.

mod availability_prober;
mod image_classifier;
mod parameter_catalog;
mod responsive_set;
mod url_builder;

pub use availability_prober::{AvailabilityProber, DEFAULT_PROBE_TIMEOUT, ProbeSettings};
pub use image_classifier::{ImageContext, classify};
pub use parameter_catalog::ParameterCatalog;
pub use responsive_set::{DEFAULT_WIDTHS, ResponsiveSetGenerator};
pub use url_builder::UrlBuilder;
