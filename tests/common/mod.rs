#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use imgix_rewrite::application::services::{ParameterCatalog, ProbeSettings};
use imgix_rewrite::domain::entities::CdnEndpoint;
use imgix_rewrite::domain::errors::ProbeError;
use imgix_rewrite::domain::ports::ProbePort;
use imgix_rewrite::infrastructure::MemoryUrlCache;
use imgix_rewrite::{ImageOptimizer, OptimizerSettings};

pub const DOMAIN: &str = "cdn.example.net";

/// Probe endpoint that answers every request the same way.
pub struct StubProbe {
    healthy: bool,
    delay: Duration,
    requests: AtomicUsize,
}

impl StubProbe {
    pub fn up() -> Self {
        Self::new(true, Duration::ZERO)
    }

    pub fn down() -> Self {
        Self::new(false, Duration::ZERO)
    }

    pub fn new(healthy: bool, delay: Duration) -> Self {
        Self {
            healthy,
            delay,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbePort for StubProbe {
    async fn fetch(&self, _url: &str) -> Result<(), ProbeError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.healthy {
            Ok(())
        } else {
            Err(ProbeError::network("stub: refused"))
        }
    }
}

pub fn settings(widths: Vec<u32>, timeout: Duration) -> OptimizerSettings {
    let endpoint = CdnEndpoint::new(DOMAIN, "", "images/");
    OptimizerSettings {
        probe: ProbeSettings {
            primary_url: endpoint.probe_url("logo.png"),
            secondary_url: endpoint.secondary_probe_url("favicon.ico"),
            timeout,
        },
        endpoint,
        widths,
        catalog: ParameterCatalog::builtin(),
    }
}

pub fn optimizer(probe: Arc<StubProbe>) -> ImageOptimizer {
    optimizer_with(probe, vec![400, 800, 1200], Duration::from_secs(3))
}

pub fn optimizer_with(probe: Arc<StubProbe>, widths: Vec<u32>, timeout: Duration) -> ImageOptimizer {
    ImageOptimizer::new(
        settings(widths, timeout),
        probe,
        Arc::new(MemoryUrlCache::new()),
    )
}
