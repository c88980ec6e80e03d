//! imgix-rewrite - Route static site images through an imgix CDN.
//!
//! This crate probes CDN availability once, builds memoized image URLs
//! with local fallbacks, generates responsive `srcset`s, and rewrites the
//! `<img>` tags of HTML pages accordingly.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the prober, URL builder, and facade.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing HTML rewriting and reporting.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "imgix-rewrite";

pub use application::{ImageOptimizer, OptimizerSettings};
pub use domain::{AvailabilityState, ImageRole, ParameterSet, ProbeOutcome};
