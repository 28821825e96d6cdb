//! Domain error types.

mod downloader_error;
mod fetch_error;

pub use downloader_error::{DownloaderError, DownloaderResult};
pub use fetch_error::{FetchError, FetchResult};
