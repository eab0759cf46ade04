// src/crawl/visited.rs
// =============================================================================
// This module tracks which URLs the crawl has already claimed.
//
// One VisitedSet is shared by every task of a traversal. It has exactly one
// mutating operation, try_mark(), which checks and inserts under a single
// lock acquisition. There is intentionally no contains(): a check followed by
// a separate insert would let two tasks both see "not visited" and both fetch.
//
// Rust concepts:
// - Mutex: Mutual exclusion so only one task touches the set at a time
// - HashSet: O(1) membership checks
// - Interior mutability: try_mark() takes &self, not &mut self
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

// A concurrency-safe set of claimed identifiers
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Claims `id` for the caller
    //
    // Returns:
    //   true  = the id was unseen and is now claimed, the caller owns it
    //   false = someone already claimed it, the caller must skip it
    pub fn try_mark(&self, id: &str) -> bool {
        let mut urls = self.lock();
        if urls.contains(id) {
            return false;
        }
        urls.insert(id.to_string())
    }

    // Number of identifiers claimed so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the set half-updated
    // (insert is the only write), so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
