//! Image decoder backed by the `image` crate.

use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::ports::ImageDecoder;

/// Decodes PNG, JPEG, WebP and GIF bytes with format sniffing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    /// Creates the decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, url: &str, bytes: &[u8]) -> FetchResult<image::DynamicImage> {
        image::load_from_memory(bytes)
            .map_err(|e| FetchError::decode(url, format!("Failed to decode image: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_decodes_png() -> Result<(), Box<dyn std::error::Error>> {
        let source = image::DynamicImage::new_rgba8(3, 2);
        let mut png = Vec::new();
        source.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

        let decoded = ImageCrateDecoder::new().decode("u", &png)?;
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        Ok(())
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = ImageCrateDecoder::new().decode("u", b"definitely not an image");
        assert!(matches!(result, Err(FetchError::Decode { ref url, .. }) if url == "u"));
    }
}
