//! Downloader facade error types.

use thiserror::Error;

use super::FetchError;

/// Result type for downloader facade operations.
pub type DownloaderResult<T> = std::result::Result<T, DownloaderError>;

/// Errors returned by the downloader facade.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DownloaderError {
    #[error("downloader is not running")]
    NotRunning,

    #[error("downloader has already been started")]
    AlreadyStarted,

    #[error("no tokio runtime available to spawn the download worker")]
    NoRuntime,

    #[error("failed to set up fetcher: {0}")]
    Fetch(#[from] FetchError),
}
