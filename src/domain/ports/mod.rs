mod delivery_port;
mod image_decoder_port;
mod image_fetcher_port;

pub use delivery_port::{DeliveryContext, DeliveryJob};
pub use image_decoder_port::ImageDecoder;
pub use image_fetcher_port::ImageFetcher;

#[cfg(test)]
pub mod mocks {
    pub use super::image_decoder_port::mock::MockImageDecoder;
    pub use super::image_fetcher_port::mock::MockImageFetcher;
}
