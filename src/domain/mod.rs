//! Domain layer with core types, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{CachedImage, DownloaderState, TargetKey, Task};
pub use errors::{DownloaderError, FetchError};
pub use ports::{DeliveryContext, DeliveryJob, ImageDecoder, ImageFetcher};
