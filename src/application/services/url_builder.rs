//! Memoized CDN URL construction.

use std::sync::Arc;

use tracing::{debug, trace};

use super::availability_prober::AvailabilityProber;
use super::parameter_catalog::ParameterCatalog;
use crate::domain::entities::{CdnEndpoint, ImageRole, ParameterSet};
use crate::domain::ports::{CacheStats, UrlCachePort};

/// Builds image URLs, routing through the CDN only once it is known to be
/// available.
///
/// Building never fails and never waits on the probe: until the probe has
/// settled, and whenever it settled as unavailable, the local fallback path
/// is returned.
pub struct UrlBuilder {
    endpoint: CdnEndpoint,
    catalog: Arc<ParameterCatalog>,
    prober: Arc<AvailabilityProber>,
    cache: Arc<dyn UrlCachePort>,
}

impl std::fmt::Debug for UrlBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlBuilder")
            .field("endpoint", &self.endpoint)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl UrlBuilder {
    /// Creates a builder.
    #[must_use]
    pub fn new(
        endpoint: CdnEndpoint,
        catalog: Arc<ParameterCatalog>,
        prober: Arc<AvailabilityProber>,
        cache: Arc<dyn UrlCachePort>,
    ) -> Self {
        Self {
            endpoint,
            catalog,
            prober,
            cache,
        }
    }

    /// Builds a URL, inferring the role from the identifier.
    #[must_use]
    pub fn build(&self, image_id: &str, overrides: &ParameterSet) -> String {
        self.build_for_role(image_id, ImageRole::from_identifier(image_id), overrides)
    }

    /// Builds a URL for an image of a known role.
    #[must_use]
    pub fn build_for_role(
        &self,
        image_id: &str,
        role: ImageRole,
        overrides: &ParameterSet,
    ) -> String {
        if image_id.is_empty() {
            return String::new();
        }

        let key = cache_key(image_id, role, overrides);
        if let Some(url) = self.cache.get(&key) {
            return url;
        }

        let state = self.prober.state();
        let url = if state.is_available() {
            let params = self.catalog.effective(role, overrides);
            self.endpoint
                .cdn_url(image_id, &params)
                .unwrap_or_else(|| self.endpoint.fallback_url(image_id))
        } else {
            trace!(image = %image_id, state = %state, "CDN not available, using fallback path");
            self.endpoint.fallback_url(image_id)
        };

        // Until the probe settles the fallback is provisional; only settled
        // answers are remembered.
        if state.is_terminal() {
            debug!(image = %image_id, role = %role, url = %url, "Built image URL");
            self.cache.insert(key, url.clone());
        }

        url
    }

    /// The endpoint URLs are built against.
    #[must_use]
    pub fn endpoint(&self) -> &CdnEndpoint {
        &self.endpoint
    }

    /// The catalog parameters are drawn from.
    #[must_use]
    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    /// URL cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn cache_key(image_id: &str, role: ImageRole, overrides: &ParameterSet) -> String {
    format!("{role}|{image_id}|{}", overrides.canonical_key())
}
