//! Cache-first fetch and decode pipeline.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::entities::{CachedImage, ImageSource};
use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::ports::{ImageDecoder, ImageFetcher};

use super::memory_cache::ImageCache;

/// Resolves URLs to decoded images, consulting and filling the cache.
///
/// Only the download worker calls [`FetchGate::resolve`], so two resolves of
/// the same URL never race and a cached URL is never fetched twice.
#[derive(Clone)]
pub struct FetchGate {
    cache: Arc<ImageCache>,
    fetcher: Arc<dyn ImageFetcher>,
    decoder: Arc<dyn ImageDecoder>,
}

impl FetchGate {
    /// Creates a gate over the given cache and collaborators.
    pub fn new(
        cache: Arc<ImageCache>,
        fetcher: Arc<dyn ImageFetcher>,
        decoder: Arc<dyn ImageDecoder>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            decoder,
        }
    }

    /// Returns the shared cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// Resolves `url` to a decoded image.
    ///
    /// # Errors
    /// Returns `FetchError::Network` if the bytes cannot be fetched and
    /// `FetchError::Decode` if they are not a valid image. Neither is retried.
    pub async fn resolve(&self, url: &str) -> FetchResult<CachedImage> {
        self.resolve_with_source(url).await.map(|(img, _)| img)
    }

    /// Like [`FetchGate::resolve`], also reporting where the image came from.
    ///
    /// # Errors
    /// See [`FetchGate::resolve`].
    pub async fn resolve_with_source(&self, url: &str) -> FetchResult<(CachedImage, ImageSource)> {
        if let Some(img) = self.cache.get(url) {
            trace!(url, source = %ImageSource::MemoryCache, "Resolved image");
            return Ok((img, ImageSource::MemoryCache));
        }

        debug!(url, "Downloading image from network");
        let bytes = self.fetcher.fetch(url).await?;

        let decoder = self.decoder.clone();
        let owned_url = url.to_string();
        let decoded = tokio::task::spawn_blocking(move || decoder.decode(&owned_url, &bytes))
            .await
            .map_err(|e| FetchError::decode(url, format!("Decode task panicked: {e}")))??;

        let img = Arc::new(decoded);
        self.cache.put(url, img.clone());

        debug!(url, source = %ImageSource::Network, width = img.width(), height = img.height(), "Image loaded successfully");
        Ok((img, ImageSource::Network))
    }
}

impl std::fmt::Debug for FetchGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchGate")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
