//! Infrastructure layer with adapters and the download pipeline.

/// Application configuration.
pub mod config;
/// Background download pipeline.
pub mod downloader;
/// Image handling (caching, fetching, decoding).
pub mod image;

pub use config::{AppConfig, CliArgs, DownloaderConfig, LogLevel};
pub use downloader::{ChannelDelivery, DeliveryQueue, Downloader, RequestTable};
pub use image::{CacheStats, FetchGate, HttpImageFetcher, ImageCache, ImageCrateDecoder};
