//! Application layer with the optimizer facade and its services.

/// Optimizer facade.
pub mod optimizer;
/// Service implementations.
pub mod services;

pub use optimizer::{ImageOptimizer, OptimizerSettings};
pub use services::{
    AvailabilityProber, ImageContext, ParameterCatalog, ProbeSettings, ResponsiveSetGenerator,
    UrlBuilder, classify,
};
