//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// CDN probing and URL caching.
pub mod image;

pub use config::{AppConfig, CliArgs, Command, ConfigError, LogLevel, StorageManager};
pub use image::{HttpProbeClient, MemoryUrlCache, optimizer_from_config};
