//! Image handling infrastructure.
//!
//! This module provides:
//! - Memory caching with weight-bounded LRU eviction
//! - A cache-first fetch and decode gate
//! - HTTP fetching and `image` crate decoding adapters

pub mod decoder;
pub mod fetch_gate;
pub mod http_fetcher;
pub mod memory_cache;

pub use decoder::ImageCrateDecoder;
pub use fetch_gate::FetchGate;
pub use http_fetcher::HttpImageFetcher;
pub use memory_cache::{CacheStats, DEFAULT_CACHE_BUDGET, ImageCache};
