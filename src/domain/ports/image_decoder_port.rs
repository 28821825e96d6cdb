//! Port for decoding fetched bytes into an image.

use crate::domain::errors::FetchResult;

/// Decodes raw bytes into an in-memory image.
///
/// Decoding is CPU bound and runs off the async executor; implementations
/// report every failure as `FetchError::Decode`.
pub trait ImageDecoder: Send + Sync {
    /// Decodes `bytes` fetched from `url`.
    fn decode(&self, url: &str, bytes: &[u8]) -> FetchResult<image::DynamicImage>;
}

#[cfg(test)]
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::errors::FetchError;

    /// Deterministic decoder: bytes prefixed with `img:` become a one-row
    /// grayscale image whose pixels are those bytes; anything else fails.
    #[derive(Default)]
    pub struct MockImageDecoder {
        calls: AtomicUsize,
    }

    impl MockImageDecoder {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of decode attempts.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ImageDecoder for MockImageDecoder {
        fn decode(&self, url: &str, bytes: &[u8]) -> FetchResult<image::DynamicImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !bytes.starts_with(b"img:") {
                return Err(FetchError::decode(url, "missing img: prefix"));
            }
            #[allow(clippy::cast_possible_truncation)]
            let width = bytes.len() as u32;
            image::GrayImage::from_raw(width, 1, bytes.to_vec())
                .map(image::DynamicImage::ImageLuma8)
                .ok_or_else(|| FetchError::decode(url, "buffer size mismatch"))
        }
    }
}
