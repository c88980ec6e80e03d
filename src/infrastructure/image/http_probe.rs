//! reqwest-backed CDN liveness client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::domain::errors::ProbeError;
use crate::domain::ports::ProbePort;

const USER_AGENT: &str = concat!("imgix-rewrite/", env!("CARGO_PKG_VERSION"));

/// Probes the CDN with plain GET requests.
#[derive(Debug, Clone)]
pub struct HttpProbeClient {
    client: Client,
    timeout: Duration,
}

impl HttpProbeClient {
    /// Creates a client whose requests give up after `timeout`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl ProbePort for HttpProbeClient {
    async fn fetch(&self, url: &str) -> Result<(), ProbeError> {
        debug!(url = %url, "Probing CDN");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "CDN probe request failed");
            if e.is_timeout() {
                ProbeError::timeout(self.timeout)
            } else if e.is_connect() {
                ProbeError::network("failed to connect to CDN")
            } else {
                ProbeError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeError::network(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(HttpProbeClient::new(Duration::from_secs(3)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_failure() -> Result<(), Box<dyn std::error::Error>> {
        let client = HttpProbeClient::new(Duration::from_secs(2))?;
        // Port 9 (discard) on loopback is closed on test machines.
        let result = client.fetch("http://127.0.0.1:9/probe.png?w=1&h=1").await;
        assert!(result.is_err());
        Ok(())
    }
}
