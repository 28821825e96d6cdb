//! Port for fetching raw image bytes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::FetchResult;

/// Fetches the raw bytes behind an image URL.
///
/// Implementations report every failure as `FetchError::Network`.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetches the bytes for `url`.
    async fn fetch(&self, url: &str) -> FetchResult<Bytes>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tokio::sync::{Semaphore, mpsc};

    use super::*;
    use crate::domain::errors::FetchError;

    /// Mock fetcher answering `img:<url>` for every URL, with per-URL failure
    /// injection, call counting and optional gating of in-flight fetches.
    pub struct MockImageFetcher {
        failures: Mutex<HashMap<String, FetchError>>,
        calls: Mutex<HashMap<String, usize>>,
        gates: Mutex<HashMap<String, Arc<Semaphore>>>,
        started_tx: mpsc::UnboundedSender<String>,
    }

    impl MockImageFetcher {
        /// Creates a mock and the receiver reporting each fetch as it starts.
        pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
            let (started_tx, started_rx) = mpsc::unbounded_channel();
            let fetcher = Self {
                failures: Mutex::new(HashMap::new()),
                calls: Mutex::new(HashMap::new()),
                gates: Mutex::new(HashMap::new()),
                started_tx,
            };
            (fetcher, started_rx)
        }

        /// Makes fetches of `url` fail.
        pub fn fail(&self, url: &str, error: FetchError) {
            self.failures.lock().insert(url.to_string(), error);
        }

        /// Makes fetches of `url` block until [`Self::release`] is called.
        pub fn hold(&self, url: &str) {
            self.gates
                .lock()
                .insert(url.to_string(), Arc::new(Semaphore::new(0)));
        }

        /// Lets one held fetch of `url` complete.
        pub fn release(&self, url: &str) {
            if let Some(gate) = self.gates.lock().get(url) {
                gate.add_permits(1);
            }
        }

        /// Number of fetches issued for `url`.
        pub fn calls(&self, url: &str) -> usize {
            self.calls.lock().get(url).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl ImageFetcher for MockImageFetcher {
        async fn fetch(&self, url: &str) -> FetchResult<Bytes> {
            *self.calls.lock().entry(url.to_string()).or_default() += 1;
            let _ = self.started_tx.send(url.to_string());

            let gate = self.gates.lock().get(url).cloned();
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }

            if let Some(err) = self.failures.lock().get(url).cloned() {
                return Err(err);
            }
            Ok(Bytes::from(format!("img:{url}")))
        }
    }
}
