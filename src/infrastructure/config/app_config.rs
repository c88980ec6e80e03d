//! Application configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use super::storage::ConfigError;
use crate::application::services::{DEFAULT_WIDTHS, ParameterCatalog, ProbeSettings};
use crate::application::OptimizerSettings;
use crate::domain::entities::{CdnEndpoint, ImageRole, ParameterSet};

const APP_NAME: &str = "imgix-rewrite";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "seqdecks";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, loaded from TOML and merged with CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path; stderr when unset.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Skip the probe and treat the CDN as unavailable.
    #[serde(skip)]
    pub offline: bool,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// CDN addressing.
    #[serde(default)]
    pub cdn: CdnConfig,

    /// Availability probe.
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Responsive image settings.
    #[serde(default)]
    pub responsive: ResponsiveConfig,

    /// Page rewriting behavior.
    #[serde(default)]
    pub page: PageConfig,

    /// Parameters applied to every CDN request.
    #[serde(default = "ParameterCatalog::builtin_base")]
    pub base_params: ParameterSet,

    /// Per-role overrides merged over the built-in catalog.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Optional per-role parameter overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Logo overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<ParameterSet>,
    /// Gallery overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<ParameterSet>,
    /// Hero overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<ParameterSet>,
    /// Service overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ParameterSet>,
    /// Default-role overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParameterSet>,
}

impl CatalogConfig {
    /// Configured overrides keyed by role.
    #[must_use]
    pub fn overrides(&self) -> HashMap<ImageRole, ParameterSet> {
        [
            (ImageRole::Logo, &self.logo),
            (ImageRole::Gallery, &self.gallery),
            (ImageRole::Hero, &self.hero),
            (ImageRole::Service, &self.service),
            (ImageRole::Default, &self.default),
        ]
        .into_iter()
        .filter_map(|(role, params)| params.clone().map(|p| (role, p)))
        .collect()
    }
}

/// CDN addressing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnConfig {
    /// imgix source domain.
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Path prefix on the CDN.
    #[serde(default)]
    pub base_path: String,

    /// Local prefix for fallback paths.
    #[serde(default = "default_fallback_prefix")]
    pub fallback_prefix: String,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            base_path: String::new(),
            fallback_prefix: default_fallback_prefix(),
        }
    }
}

/// Availability probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Image requested at 1x1 under the base path.
    #[serde(default = "default_probe_image")]
    pub image: String,

    /// Path at the domain root tried when the image fails.
    #[serde(default = "default_secondary_path")]
    pub secondary_path: String,

    /// Deadline for the whole probe in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            image: default_probe_image(),
            secondary_path: default_secondary_path(),
            timeout_ms: default_probe_timeout_ms(),
        }
    }
}

/// Responsive image configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsiveConfig {
    /// Candidate widths.
    #[serde(default = "default_widths")]
    pub widths: Vec<u32>,

    /// `sizes` attribute added next to `srcset`.
    #[serde(default = "default_sizes")]
    pub sizes: String,
}

impl Default for ResponsiveConfig {
    fn default() -> Self {
        Self {
            widths: default_widths(),
            sizes: default_sizes(),
        }
    }
}

/// Page rewriting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Add `loading="lazy"` to rewritten images.
    #[serde(default = "default_true")]
    pub lazy_loading: bool,

    /// Wrap gallery images in `<picture>` with mobile/tablet crops.
    #[serde(default = "default_true")]
    pub art_direction: bool,

    /// Inject the performance overlay into rewritten pages.
    #[serde(default)]
    pub debug_widget: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            lazy_loading: true,
            art_direction: true,
            debug_widget: false,
        }
    }
}

fn default_domain() -> String {
    "seqdecks.imgix.net".to_string()
}

fn default_fallback_prefix() -> String {
    "images/".to_string()
}

fn default_probe_image() -> String {
    "logo.png".to_string()
}

fn default_secondary_path() -> String {
    "favicon.ico".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

fn default_widths() -> Vec<u32> {
    DEFAULT_WIDTHS.to_vec()
}

fn default_sizes() -> String {
    "(max-width: 768px) 100vw, 800px".to_string()
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(domain) = &args.domain {
            self.cdn.domain.clone_from(domain);
        }
        if let Some(timeout_ms) = args.probe_timeout_ms {
            self.probe.timeout_ms = timeout_ms;
        }
        if args.offline {
            self.offline = true;
        }
    }

    /// Checks values that would make every URL invalid.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` for an empty domain, an empty width
    /// list, a zero width, or a zero probe timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cdn.domain.trim().is_empty() {
            return Err(ConfigError::invalid("cdn.domain must not be empty"));
        }
        if self.responsive.widths.is_empty() {
            return Err(ConfigError::invalid("responsive.widths must not be empty"));
        }
        if self.responsive.widths.contains(&0) {
            return Err(ConfigError::invalid("responsive.widths must be positive"));
        }
        if self.probe.timeout_ms == 0 {
            return Err(ConfigError::invalid("probe.timeout_ms must be positive"));
        }
        Ok(())
    }

    /// Probe deadline.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe.timeout_ms)
    }

    /// CDN endpoint described by this configuration.
    #[must_use]
    pub fn endpoint(&self) -> CdnEndpoint {
        CdnEndpoint::new(
            self.cdn.domain.trim(),
            self.cdn.base_path.as_str(),
            self.cdn.fallback_prefix.as_str(),
        )
    }

    /// Settings for the optimizer facade.
    #[must_use]
    pub fn optimizer_settings(&self) -> OptimizerSettings {
        let endpoint = self.endpoint();
        OptimizerSettings {
            probe: ProbeSettings {
                primary_url: endpoint.probe_url(&self.probe.image),
                secondary_url: endpoint.secondary_probe_url(&self.probe.secondary_path),
                timeout: self.probe_timeout(),
            },
            endpoint,
            widths: self.responsive.widths.clone(),
            catalog: ParameterCatalog::builtin_with(Some(&self.base_params), &self.catalog.overrides()),
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            offline: false,
            log_level: LogLevel::Info,
            cdn: CdnConfig::default(),
            probe: ProbeConfig::default(),
            responsive: ResponsiveConfig::default(),
            page: PageConfig::default(),
            base_params: ParameterCatalog::builtin_base(),
            catalog: CatalogConfig::default(),
        }
    }
}
