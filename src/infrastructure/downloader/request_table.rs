//! Target to desired-URL table used for staleness decisions.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::entities::TargetKey;

/// Concurrent map from target to the URL it currently wants.
///
/// Presence means the target has an outstanding request; absence means it
/// was never requested, was withdrawn, or has been delivered.
pub struct RequestTable<T> {
    entries: RwLock<HashMap<T, String>>,
}

impl<T: TargetKey> RequestTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Binds `target` to `url`, returning the previous binding.
    pub fn set(&self, target: T, url: impl Into<String>) -> Option<String> {
        self.entries.write().insert(target, url.into())
    }

    /// Withdraws any binding for `target`.
    pub fn remove(&self, target: &T) -> Option<String> {
        self.entries.write().remove(target)
    }

    /// Returns the URL `target` currently wants.
    #[must_use]
    pub fn get(&self, target: &T) -> Option<String> {
        self.entries.read().get(target).cloned()
    }

    /// Returns true if `target` is still bound to exactly `url`.
    #[must_use]
    pub fn is_current(&self, target: &T, url: &str) -> bool {
        self.entries
            .read()
            .get(target)
            .is_some_and(|current| current == url)
    }

    /// Removes the binding only if it is still `url`. Returns whether it did.
    pub fn remove_if_current(&self, target: &T, url: &str) -> bool {
        let mut entries = self.entries.write();
        if entries.get(target).is_some_and(|current| current == url) {
            entries.remove(target);
            true
        } else {
            false
        }
    }

    /// Drops every binding.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of targets with an outstanding request.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no target has an outstanding request.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<T: TargetKey> Default for RequestTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for RequestTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestTable")
            .field("len", &self.entries.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let table = RequestTable::new();
        assert_eq!(table.set(1, "x"), None);
        assert_eq!(table.set(1, "y"), Some("x".to_string()));
        assert_eq!(table.get(&1).as_deref(), Some("y"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_compare_uses_value_equality() {
        let table = RequestTable::new();
        table.set("row-1", String::from("https://a/x.png"));
        let fetched = format!("https://a/{}.png", "x");

        assert!(table.is_current(&"row-1", &fetched));
        assert!(!table.is_current(&"row-1", "https://a/y.png"));
        assert!(!table.is_current(&"row-2", &fetched));
    }

    #[test]
    fn test_remove_if_current() {
        let table = RequestTable::new();
        table.set(7, "x");

        assert!(!table.remove_if_current(&7, "y"));
        assert_eq!(table.get(&7).as_deref(), Some("x"));

        assert!(table.remove_if_current(&7, "x"));
        assert!(table.is_empty());
        assert!(!table.remove_if_current(&7, "x"));
    }

    #[test]
    fn test_remove_and_clear() {
        let table = RequestTable::new();
        table.set(1, "a");
        table.set(2, "b");

        assert_eq!(table.remove(&1), Some("a".to_string()));
        assert_eq!(table.get(&1), None);

        table.clear();
        assert!(table.is_empty());
    }

    #[test]
    fn test_concurrent_writers_keep_last_value() {
        let table = std::sync::Arc::new(RequestTable::new());
        let writers: Vec<_> = (0..8u32)
            .map(|th| {
                let table = table.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        table.set(th, format!("u{th}-{i}"));
                        assert!(table.get(&th).is_some());
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().expect("writer panicked");
        }

        assert_eq!(table.len(), 8);
        for th in 0..8u32 {
            assert!(table.is_current(&th, &format!("u{th}-499")));
        }
    }

    #[test]
    fn test_concurrent_remove_if_current_succeeds_once() {
        let table = std::sync::Arc::new(RequestTable::new());
        table.set("shared", "x");
        let removers: Vec<_> = (0..8)
            .map(|_| {
                let table = table.clone();
                std::thread::spawn(move || table.remove_if_current(&"shared", "x"))
            })
            .collect();

        let removed = removers
            .into_iter()
            .map(|r| r.join().expect("remover panicked"))
            .filter(|removed| *removed)
            .count();
        assert_eq!(removed, 1);
        assert!(table.is_empty());
    }
}
