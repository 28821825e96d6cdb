//! Public facade composing the request table, worker, and image cache.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::domain::entities::{CachedImage, DownloaderState, TargetKey};
use crate::domain::errors::{DownloaderError, DownloaderResult};
use crate::domain::ports::{DeliveryContext, ImageDecoder, ImageFetcher};
use crate::infrastructure::config::DownloaderConfig;
use crate::infrastructure::image::{
    CacheStats, FetchGate, HttpImageFetcher, ImageCache, ImageCrateDecoder,
};

use super::worker::{DownloadWorker, Shared};

/// Background image downloader delivering decoded images to targets.
///
/// Each target keeps only its most recent request: results for URLs the
/// target no longer wants are discarded instead of delivered. Deliveries run
/// on the [`DeliveryContext`] given at construction, never on the worker.
pub struct Downloader<T: TargetKey> {
    shared: Arc<Shared<T>>,
    gate: FetchGate,
    delivery: Arc<dyn DeliveryContext>,
    worker: Mutex<Option<DownloadWorker<T>>>,
}

impl<T: TargetKey> Downloader<T> {
    /// Creates a downloader over the given collaborators. Call
    /// [`Downloader::start`] before queueing requests.
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        decoder: Arc<dyn ImageDecoder>,
        delivery: Arc<dyn DeliveryContext>,
        config: &DownloaderConfig,
    ) -> Self {
        let cache = Arc::new(ImageCache::new(config.cache_budget_bytes));
        Self {
            shared: Arc::new(Shared::new()),
            gate: FetchGate::new(cache, fetcher, decoder),
            delivery,
            worker: Mutex::new(None),
        }
    }

    /// Creates a downloader fetching over HTTP and decoding with the `image` crate.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(
        config: &DownloaderConfig,
        delivery: Arc<dyn DeliveryContext>,
    ) -> DownloaderResult<Self> {
        let fetcher = HttpImageFetcher::new(
            Duration::from_secs(config.request_timeout_secs),
            &config.user_agent,
        )?;
        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(ImageCrateDecoder::new()),
            delivery,
            config,
        ))
    }

    /// Spawns the background worker on the current tokio runtime.
    ///
    /// # Errors
    /// Returns `AlreadyStarted` if running, `NotRunning` if already stopped,
    /// and `NoRuntime` outside a tokio runtime.
    pub fn start(&self) -> DownloaderResult<()> {
        let mut worker = self.worker.lock();
        if self.shared.is_stopped() {
            return Err(DownloaderError::NotRunning);
        }
        if worker.is_some() {
            return Err(DownloaderError::AlreadyStarted);
        }
        *worker = Some(DownloadWorker::spawn(
            self.shared.clone(),
            self.gate.clone(),
            self.delivery.clone(),
        )?);
        Ok(())
    }

    /// Stops the worker. Idempotent; nothing is delivered afterwards.
    pub fn stop(&self) {
        if let Some(worker) = self.worker.lock().as_ref() {
            worker.stop();
        } else if !self.shared.stopped.swap(true, std::sync::atomic::Ordering::SeqCst) {
            info!("Downloader stopped before it was started");
        }
    }

    /// Stops the worker and waits for its loop to exit.
    pub async fn shutdown(&self) {
        self.stop();
        let worker = self.worker.lock().take();
        if let Some(mut worker) = worker {
            worker.join().await;
        }
    }

    /// Requests `url` for `target`, superseding any earlier request for it.
    /// `None` withdraws the target's request.
    ///
    /// # Errors
    /// Returns `NotRunning` before [`Downloader::start`] or after [`Downloader::stop`].
    pub fn queue(&self, target: T, url: Option<&str>) -> DownloaderResult<()> {
        self.with_worker(|worker| worker.enqueue_download(target, url.map(str::to_string)))
    }

    /// Warms the cache with `url` without binding it to a target.
    ///
    /// # Errors
    /// Returns `NotRunning` before [`Downloader::start`] or after [`Downloader::stop`].
    pub fn preload(&self, url: &str) -> DownloaderResult<()> {
        self.with_worker(|worker| worker.preload(url.to_string()))
    }

    /// Drops every download not yet started. Preloads and the in-flight task
    /// are unaffected.
    ///
    /// # Errors
    /// Returns `NotRunning` before [`Downloader::start`] or after [`Downloader::stop`].
    pub fn clear_queue(&self) -> DownloaderResult<()> {
        self.with_worker(DownloadWorker::clear_queue)
    }

    /// Empties the image cache.
    pub fn clear_cache(&self) {
        self.gate.cache().evict_all();
    }

    /// Returns the cached image for `url`, if any.
    ///
    /// Caller lookups neither promote recency nor count in [`CacheStats`];
    /// only the worker's resolves do.
    #[must_use]
    pub fn get_cached(&self, url: &str) -> Option<CachedImage> {
        self.gate.cache().peek(url)
    }

    /// Registers the callback receiving delivered images, replacing any
    /// previous one.
    pub fn set_listener<F>(&self, listener: F)
    where
        F: Fn(T, CachedImage) + Send + Sync + 'static,
    {
        *self.shared.listener.write() = Some(Arc::new(listener));
        debug!("Registered download listener");
    }

    /// Returns image cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.gate.cache().stats()
    }

    /// Number of targets with an outstanding request.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.shared.table.len()
    }

    /// Returns the URL `target` is currently waiting for.
    #[must_use]
    pub fn requested_url(&self, target: &T) -> Option<String> {
        self.shared.table.get(target)
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> DownloaderState {
        if self.shared.is_stopped() {
            DownloaderState::Stopped
        } else if self.worker.lock().is_some() {
            DownloaderState::Running
        } else {
            DownloaderState::NotStarted
        }
    }

    fn with_worker<R>(
        &self,
        f: impl FnOnce(&DownloadWorker<T>) -> DownloaderResult<R>,
    ) -> DownloaderResult<R> {
        let worker = self.worker.lock();
        match worker.as_ref() {
            Some(worker) => f(worker),
            None => Err(DownloaderError::NotRunning),
        }
    }
}

impl<T: TargetKey> std::fmt::Debug for Downloader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("state", &self.state())
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
