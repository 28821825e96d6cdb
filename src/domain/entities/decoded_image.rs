//! Decoded image types shared between the cache, fetch gate and listeners.

use std::sync::Arc;

/// A decoded image as held by the cache and handed to listeners.
///
/// Shared so that a cache hit and a delivery refer to the same pixel buffer.
pub type CachedImage = Arc<image::DynamicImage>;

/// Returns the weight of a decoded image: the byte size of its pixel buffer.
#[must_use]
pub fn image_weight(image: &image::DynamicImage) -> usize {
    image.as_bytes().len()
}

/// Where a resolved image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Served from the in-memory LRU cache.
    MemoryCache,
    /// Fetched and decoded from the network.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory"),
            Self::Network => write!(f, "network"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_is_pixel_buffer_size() {
        let rgb = image::DynamicImage::new_rgb8(10, 4);
        assert_eq!(image_weight(&rgb), 10 * 4 * 3);

        let rgba = image::DynamicImage::new_rgba8(2, 2);
        assert_eq!(image_weight(&rgba), 16);
    }
}
