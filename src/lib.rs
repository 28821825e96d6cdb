//! Thumbloader - background image fetching for UI-bound clients.
//!
//! Callers bind opaque targets to image URLs; a single background worker
//! fetches and decodes them, caches the results by URL, and delivers each
//! image on the caller's context only if it is still what the target wants.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters and the download pipeline.
pub mod infrastructure;

pub use domain::{CachedImage, DeliveryContext, DownloaderError, FetchError};
pub use infrastructure::Downloader;

/// Current version of the library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = "thumbloader";
