//! Per-physical-resource mutual exclusion.

use std::collections::HashSet;
use std::sync::Mutex;
use tracing::warn;

/// Non-blocking mutual exclusion keyed by physical resource.
///
/// At most one holder per key at any instant. Callers that fail to acquire
/// retry with bounded backoff rather than blocking, so starvation surfaces
/// as a reportable timeout instead of a hang.
#[derive(Debug, Default)]
pub struct ExclusionLock {
    held: Mutex<HashSet<String>>,
}

impl ExclusionLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to acquire the key. Returns false if it is already held.
    pub fn try_acquire(&self, key: &str) -> bool {
        self.held.lock().unwrap().insert(key.to_string())
    }

    /// Release a held key. Releasing an unheld key is a no-op.
    pub fn release(&self, key: &str) {
        if !self.held.lock().unwrap().remove(key) {
            warn!(key, "Released exclusivity key that was not held");
        }
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.lock().unwrap().contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutual_exclusion() {
        let lock = ExclusionLock::new();
        assert!(lock.try_acquire("node0:dev0"));
        assert!(!lock.try_acquire("node0:dev0"));
        assert!(lock.try_acquire("node0:dev1"));

        lock.release("node0:dev0");
        assert!(lock.try_acquire("node0:dev0"));
    }

    #[test]
    fn test_release_unheld_is_noop() {
        let lock = ExclusionLock::new();
        lock.release("node0:dev0");
        assert!(lock.try_acquire("node0:dev0"));
    }

    #[test]
    fn test_contended_acquire_has_single_winner() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let lock = Arc::new(ExclusionLock::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = lock.clone();
                let winners = winners.clone();
                std::thread::spawn(move || {
                    if lock.try_acquire("shared") {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
