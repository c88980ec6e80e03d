//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{
    AppConfig, CatalogConfig, CdnConfig, LogLevel, PageConfig, ProbeConfig, ResponsiveConfig,
};
pub use args::{CliArgs, Command, ImageArgs, RewriteArgs};
pub use storage::{ConfigError, StorageManager};
