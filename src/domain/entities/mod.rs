//! Domain entity definitions.

mod decoded_image;
mod task;

pub use decoded_image::{CachedImage, ImageSource, image_weight};
pub use task::{DownloaderState, TargetKey, Task};
