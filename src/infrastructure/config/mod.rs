//! Application configuration.

pub mod app_config;
/// Command-line arguments.
pub mod args;
/// Config file loading.
pub mod storage;

pub use app_config::{AppConfig, DownloaderConfig, LogLevel};
pub use args::CliArgs;
pub use storage::{ConfigError, load_config};
