//! Image optimizer facade.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use super::services::{
    AvailabilityProber, ParameterCatalog, ProbeSettings, ResponsiveSetGenerator, UrlBuilder,
};
use crate::domain::entities::{CdnEndpoint, ImageRole, ParameterSet, ResponsiveSet};
use crate::domain::ports::{CacheStats, ProbePort, UrlCachePort};
use crate::domain::{AvailabilityState, ProbeOutcome};

/// Everything needed to assemble an [`ImageOptimizer`].
#[derive(Debug, Clone)]
pub struct OptimizerSettings {
    /// CDN and fallback addressing.
    pub endpoint: CdnEndpoint,
    /// Probe targets and deadline.
    pub probe: ProbeSettings,
    /// Responsive breakpoints.
    pub widths: Vec<u32>,
    /// Role parameter tables.
    pub catalog: ParameterCatalog,
}

/// Single entry point for the page layer: availability, URLs, srcsets.
#[derive(Debug, Clone)]
pub struct ImageOptimizer {
    prober: Arc<AvailabilityProber>,
    builder: Arc<UrlBuilder>,
    responsive: Arc<ResponsiveSetGenerator>,
}

impl ImageOptimizer {
    /// Wires the prober, builder, and responsive generator together.
    #[must_use]
    pub fn new(
        settings: OptimizerSettings,
        probe_port: Arc<dyn ProbePort>,
        cache: Arc<dyn UrlCachePort>,
    ) -> Self {
        let prober = Arc::new(AvailabilityProber::new(probe_port, settings.probe));
        let builder = Arc::new(UrlBuilder::new(
            settings.endpoint,
            Arc::new(settings.catalog),
            prober.clone(),
            cache,
        ));
        let responsive = Arc::new(ResponsiveSetGenerator::new(
            builder.clone(),
            settings.widths,
        ));

        debug!(widths = ?responsive.widths(), "Image optimizer ready");

        Self {
            prober,
            builder,
            responsive,
        }
    }

    /// Runs the availability probe once; later calls reuse the result.
    pub async fn probe_availability(&self) -> AvailabilityState {
        self.prober.probe().await
    }

    /// Synchronous availability snapshot.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.prober.is_available()
    }

    /// Current probe state.
    #[must_use]
    pub fn state(&self) -> AvailabilityState {
        self.prober.state()
    }

    /// Settled probe outcome, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<&ProbeOutcome> {
        self.prober.outcome()
    }

    /// Settles availability without probing. Returns false if already
    /// settled or probing.
    pub fn force_outcome(&self, outcome: ProbeOutcome) -> bool {
        self.prober.force_outcome(outcome)
    }

    /// Probe state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AvailabilityState> {
        self.prober.subscribe()
    }

    /// Builds an image URL, inferring the role from the identifier.
    #[must_use]
    pub fn build_url(&self, image_id: &str, overrides: &ParameterSet) -> String {
        self.builder.build(image_id, overrides)
    }

    /// Builds an image URL for a known role.
    #[must_use]
    pub fn build_url_for_role(
        &self,
        image_id: &str,
        role: ImageRole,
        overrides: &ParameterSet,
    ) -> String {
        self.builder.build_for_role(image_id, role, overrides)
    }

    /// Builds a responsive set, inferring the role from the identifier.
    #[must_use]
    pub fn build_responsive_set(&self, image_id: &str, base_params: &ParameterSet) -> ResponsiveSet {
        self.responsive.build_set(image_id, base_params)
    }

    /// Builds a responsive set for a known role.
    #[must_use]
    pub fn build_responsive_set_for_role(
        &self,
        image_id: &str,
        role: ImageRole,
        base_params: &ParameterSet,
    ) -> ResponsiveSet {
        self.responsive.build_set_for_role(image_id, role, base_params)
    }

    /// Parameter catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &ParameterCatalog {
        self.builder.catalog()
    }

    /// CDN addressing in use.
    #[must_use]
    pub fn endpoint(&self) -> &CdnEndpoint {
        self.builder.endpoint()
    }

    /// URL cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.builder.cache_stats()
    }
}
