mod probe_port;
mod url_cache_port;

pub use probe_port::ProbePort;
pub use url_cache_port::{CacheStats, UrlCachePort};

#[cfg(test)]
pub mod mocks {
    pub use super::probe_port::mock::MockProbePort;
}
