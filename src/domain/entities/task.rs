//! Units of work drained by the download worker.

use std::fmt::Debug;
use std::hash::Hash;

/// Bound required of caller-supplied target keys.
///
/// Targets are compared by value, so they must have a real equality.
pub trait TargetKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> TargetKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// A queued unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task<T> {
    /// Fetch whatever URL the target is bound to when the task runs.
    Download(T),
    /// Warm the cache for a URL with no bound target.
    Preload(String),
}

impl<T> Task<T> {
    /// Returns true for `Download` tasks.
    #[must_use]
    pub const fn is_download(&self) -> bool {
        matches!(self, Self::Download(_))
    }
}

/// Lifecycle of the downloader and its worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloaderState {
    /// Constructed, worker not spawned yet.
    #[default]
    NotStarted,
    /// Worker is draining the queue.
    Running,
    /// Terminal; no further deliveries happen.
    Stopped,
}

impl std::fmt::Display for DownloaderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}
