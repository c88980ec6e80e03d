//! CDN adapters.
//!
//! This module provides:
//! - The reqwest liveness client used by the availability probe
//! - The in-memory URL cache
//! - Wiring of both into an [`ImageOptimizer`]

pub mod http_probe;
pub mod url_cache;

use std::sync::Arc;

pub use http_probe::HttpProbeClient;
pub use url_cache::MemoryUrlCache;

use crate::application::ImageOptimizer;
use crate::domain::errors::ProbeError;
use crate::domain::ProbeOutcome;
use crate::infrastructure::config::AppConfig;

/// Builds an optimizer backed by HTTP probing and an in-memory cache.
///
/// In offline mode the optimizer is settled as unavailable up front.
///
/// # Errors
/// Returns error if the HTTP client cannot be created.
pub fn optimizer_from_config(config: &AppConfig) -> Result<ImageOptimizer, ProbeError> {
    let probe_port = Arc::new(HttpProbeClient::new(config.probe_timeout())?);
    let optimizer = ImageOptimizer::new(
        config.optimizer_settings(),
        probe_port,
        Arc::new(MemoryUrlCache::new()),
    );

    if config.offline {
        optimizer.force_outcome(ProbeOutcome::Unavailable(ProbeError::network(
            "offline mode",
        )));
    }

    Ok(optimizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AvailabilityState;
    use crate::domain::entities::ParameterSet;

    #[tokio::test]
    async fn test_offline_optimizer_never_probes() -> Result<(), Box<dyn std::error::Error>> {
        let config = AppConfig {
            offline: true,
            ..AppConfig::default()
        };
        let optimizer = optimizer_from_config(&config)?;

        assert_eq!(optimizer.state(), AvailabilityState::Unavailable);
        assert_eq!(
            optimizer.probe_availability().await,
            AvailabilityState::Unavailable
        );
        assert_eq!(
            optimizer.build_url("hero.jpg", &ParameterSet::new()),
            "images/hero.jpg"
        );
        Ok(())
    }
}
