//! imgix endpoint addressing.

use reqwest::Url;
use tracing::warn;

use super::ParameterSet;

/// Side length of the probe image requested from the CDN.
pub const PROBE_PIXELS: u32 = 1;

/// Where images live on the CDN and locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnEndpoint {
    /// CDN host, e.g. `seqdecks.imgix.net`.
    pub domain: String,
    /// Path prefix on the CDN, empty or ending with `/`.
    pub base_path: String,
    /// Local prefix used when the CDN is not available.
    pub fallback_prefix: String,
}

impl CdnEndpoint {
    /// Creates an endpoint, normalizing `base_path` to end with `/`.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        base_path: impl Into<String>,
        fallback_prefix: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            base_path: normalize_prefix(&base_path.into()),
            fallback_prefix: fallback_prefix.into(),
        }
    }

    /// Composes `https://<domain>/<base_path><image_id>?<query>`.
    ///
    /// Values are percent-encoded one by one; keys are written raw, in
    /// sorted order. Returns `None` if the result is not a valid URL.
    #[must_use]
    pub fn cdn_url(&self, image_id: &str, params: &ParameterSet) -> Option<String> {
        let raw = format!(
            "https://{}/{}{}",
            self.domain,
            self.base_path,
            image_id.trim_start_matches('/')
        );

        let mut url: String = match Url::parse(&raw) {
            Ok(url) => url.into(),
            Err(e) => {
                warn!(url = %raw, error = %e, "Rejected malformed CDN URL");
                return None;
            }
        };

        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.to_query());
        }

        Some(url)
    }

    /// Local path served when the CDN is down: no host, no parameters.
    #[must_use]
    pub fn fallback_url(&self, image_id: &str) -> String {
        format!(
            "{}{}",
            self.fallback_prefix,
            image_id.trim_start_matches('/')
        )
    }

    /// URL of the minimal probe resource under `base_path`.
    #[must_use]
    pub fn probe_url(&self, image: &str) -> String {
        format!(
            "https://{}/{}{}?w={PROBE_PIXELS}&h={PROBE_PIXELS}",
            self.domain,
            self.base_path,
            image.trim_start_matches('/')
        )
    }

    /// URL of the secondary probe resource at the domain root.
    #[must_use]
    pub fn secondary_probe_url(&self, path: &str) -> String {
        format!(
            "https://{}/{}?w={PROBE_PIXELS}&h={PROBE_PIXELS}",
            self.domain,
            path.trim_start_matches('/')
        )
    }

    /// Checks if a URL already points at this CDN.
    #[must_use]
    pub fn is_cdn_url(&self, url: &str) -> bool {
        !self.domain.is_empty() && url.contains(&self.domain)
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}
