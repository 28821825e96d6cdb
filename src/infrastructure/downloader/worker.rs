//! Single background worker draining download and preload tasks.
//!
//! Commands arrive over an unbounded channel and are applied to a local
//! FIFO before the next task is taken, so a `ClearQueue` removes exactly the
//! downloads sent ahead of it. Tasks run one at a time; an in-flight fetch is
//! never interrupted, only its delivery suppressed.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::domain::entities::{CachedImage, TargetKey, Task};
use crate::domain::errors::{DownloaderError, DownloaderResult};
use crate::domain::ports::DeliveryContext;
use crate::infrastructure::image::FetchGate;

use super::request_table::RequestTable;

/// Callback receiving a delivered image on the delivery context.
pub type Listener<T> = Arc<dyn Fn(T, CachedImage) + Send + Sync>;

/// State shared between the caller-facing handle, the worker loop, and
/// posted delivery jobs.
pub(crate) struct Shared<T> {
    pub(crate) table: RequestTable<T>,
    pub(crate) stopped: AtomicBool,
    pub(crate) listener: RwLock<Option<Listener<T>>>,
}

impl<T: TargetKey> Shared<T> {
    pub(crate) fn new() -> Self {
        Self {
            table: RequestTable::new(),
            stopped: AtomicBool::new(false),
            listener: RwLock::new(None),
        }
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
enum WorkerCommand<T> {
    Enqueue(Task<T>),
    ClearQueue,
    Shutdown,
}

/// Caller-side handle to a running download worker.
pub struct DownloadWorker<T: TargetKey> {
    shared: Arc<Shared<T>>,
    request_tx: mpsc::UnboundedSender<WorkerCommand<T>>,
    handle: Option<JoinHandle<()>>,
}

impl<T: TargetKey> std::fmt::Debug for DownloadWorker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadWorker")
            .field("stopped", &self.shared.is_stopped())
            .field("table", &self.shared.table)
            .finish_non_exhaustive()
    }
}

/// State for the background worker loop.
struct WorkerState<T: TargetKey> {
    shared: Arc<Shared<T>>,
    gate: FetchGate,
    delivery: Arc<dyn DeliveryContext>,
    request_rx: mpsc::UnboundedReceiver<WorkerCommand<T>>,
    queue: VecDeque<Task<T>>,
}

impl<T: TargetKey> DownloadWorker<T> {
    /// Spawns the worker loop on the current tokio runtime.
    ///
    /// # Errors
    /// Returns `DownloaderError::NoRuntime` outside a tokio runtime.
    pub(crate) fn spawn(
        shared: Arc<Shared<T>>,
        gate: FetchGate,
        delivery: Arc<dyn DeliveryContext>,
    ) -> DownloaderResult<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            error!(error = %e, "Cannot start download worker");
            DownloaderError::NoRuntime
        })?;

        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let state = WorkerState {
            shared: shared.clone(),
            gate,
            delivery,
            request_rx,
            queue: VecDeque::new(),
        };
        let handle = runtime.spawn(state.run());
        info!("Download worker started");

        Ok(Self {
            shared,
            request_tx,
            handle: Some(handle),
        })
    }

    /// Binds `target` to `url` and queues a download for it, or withdraws the
    /// target's request when `url` is `None`.
    ///
    /// A withdrawal queues nothing: any download already queued for the
    /// target finds the table changed when it runs.
    ///
    /// # Errors
    /// Returns `DownloaderError::NotRunning` once the worker has stopped.
    pub fn enqueue_download(&self, target: T, url: Option<String>) -> DownloaderResult<()> {
        self.ensure_running()?;
        match url {
            Some(url) => {
                debug!(target = ?target, url = %url, "Queued download");
                self.shared.table.set(target.clone(), url);
                self.send(WorkerCommand::Enqueue(Task::Download(target)))
            }
            None => {
                if self.shared.table.remove(&target).is_some() {
                    debug!(target = ?target, "Withdrew download request");
                }
                Ok(())
            }
        }
    }

    /// Queues a cache-warming fetch of `url`.
    ///
    /// # Errors
    /// Returns `DownloaderError::NotRunning` once the worker has stopped.
    pub fn preload(&self, url: String) -> DownloaderResult<()> {
        self.ensure_running()?;
        trace!(url = %url, "Queued preload");
        self.send(WorkerCommand::Enqueue(Task::Preload(url)))
    }

    /// Drops every download not yet started. Preloads stay queued.
    ///
    /// # Errors
    /// Returns `DownloaderError::NotRunning` once the worker has stopped.
    pub fn clear_queue(&self) -> DownloaderResult<()> {
        self.ensure_running()?;
        self.send(WorkerCommand::ClearQueue)
    }

    /// Stops the worker. Queued tasks are dropped and no further deliveries
    /// happen; an in-flight fetch finishes but is not delivered.
    pub fn stop(&self) {
        if self.shared.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.table.clear();
        let _ = self.request_tx.send(WorkerCommand::Shutdown);
        info!("Download worker stopping");
    }

    /// Returns true once [`DownloadWorker::stop`] has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.is_stopped()
    }

    /// Stops the worker and waits for its loop to exit.
    pub async fn join(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            error!(error = %e, "Download worker task failed");
        }
    }

    fn ensure_running(&self) -> DownloaderResult<()> {
        if self.shared.is_stopped() {
            Err(DownloaderError::NotRunning)
        } else {
            Ok(())
        }
    }

    fn send(&self, cmd: WorkerCommand<T>) -> DownloaderResult<()> {
        self.request_tx.send(cmd).map_err(|e| {
            error!("Failed to send worker command: {}", e);
            DownloaderError::NotRunning
        })
    }
}

impl<T: TargetKey> Drop for DownloadWorker<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<T: TargetKey> WorkerState<T> {
    /// Worker loop: apply pending commands, then run the oldest task.
    async fn run(mut self) {
        loop {
            while let Ok(cmd) = self.request_rx.try_recv() {
                if !self.apply(cmd) {
                    return self.finish();
                }
            }
            if self.shared.is_stopped() {
                return self.finish();
            }

            let Some(task) = self.queue.pop_front() else {
                let Some(cmd) = self.request_rx.recv().await else {
                    return self.finish();
                };
                if self.apply(cmd) {
                    continue;
                }
                return self.finish();
            };

            match task {
                Task::Download(target) => self.handle_download(target).await,
                Task::Preload(url) => self.handle_preload(&url).await,
            }
        }
    }

    /// Applies one command. Returns false on shutdown.
    fn apply(&mut self, cmd: WorkerCommand<T>) -> bool {
        match cmd {
            WorkerCommand::Enqueue(task) => self.queue.push_back(task),
            WorkerCommand::ClearQueue => {
                let before = self.queue.len();
                self.queue.retain(|task| !task.is_download());
                let removed = before - self.queue.len();
                if removed > 0 {
                    debug!(count = removed, "Cleared queued downloads");
                }
            }
            WorkerCommand::Shutdown => return false,
        }
        true
    }

    fn finish(&mut self) {
        let dropped = self.queue.len();
        self.queue.clear();
        debug!(dropped, "Download worker stopped");
    }

    async fn handle_download(&self, target: T) {
        let Some(url) = self.shared.table.get(&target) else {
            trace!(target = ?target, "Request withdrawn before processing");
            return;
        };
        debug!(target = ?target, url = %url, "Processing download");

        let image = match self.gate.resolve(&url).await {
            Ok(image) => image,
            Err(e) => {
                warn!(target = ?target, error = %e, "Error downloading image");
                return;
            }
        };

        if self.shared.is_stopped() || !self.shared.table.is_current(&target, &url) {
            debug!(target = ?target, url = %url, "Discarding stale download");
            return;
        }

        let shared = self.shared.clone();
        self.delivery.post(Box::new(move || {
            deliver(&shared, target, &url, image);
        }));
    }

    async fn handle_preload(&self, url: &str) {
        match self.gate.resolve(url).await {
            Ok(_) => trace!(url, "Preloaded image"),
            Err(e) => warn!(error = %e, "Error preloading image"),
        }
    }
}

/// Runs on the delivery context. The table may have changed, or the worker
/// stopped, since the job was posted, so both are checked again here.
fn deliver<T: TargetKey>(shared: &Shared<T>, target: T, url: &str, image: CachedImage) {
    if shared.is_stopped() {
        return;
    }
    if !shared.table.remove_if_current(&target, url) {
        debug!(target = ?target, url, "Request superseded before delivery");
        return;
    }
    let listener = shared.listener.read().clone();
    match listener {
        Some(listener) => {
            debug!(target = ?target, url, "Delivering image");
            listener(target, image);
        }
        None => debug!(target = ?target, "No listener registered, dropping image"),
    }
}
