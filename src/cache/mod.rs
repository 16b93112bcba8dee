// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL-based response and page caching
//!
//! A single mutex guards the whole map. Expired entries are purged lazily
//! when the same key is read again; there is no background sweep.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

struct CachedEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently held, including stale ones not yet purged
    pub total: usize,
    /// Stale entries still waiting for a read to purge them
    pub expired: usize,
}

/// Thread-safe key/value store whose entries expire `ttl` after they were set
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CachedEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create a new cache
    ///
    /// # Arguments
    /// * `ttl` - How long an entry stays visible after `set`
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn from_secs(ttl_secs: u64) -> Self {
        Self::new(Duration::from_secs(ttl_secs))
    }

    /// Get a live value
    ///
    /// An expired entry is removed in the same critical section and reported
    /// as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();
        let fresh = entries.get(key)?.stored_at.elapsed() < self.ttl;
        if fresh {
            entries.get(key).map(|entry| entry.value.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    /// Store a value, replacing whatever was there (last write wins)
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.lock().insert(
            key.into(),
            CachedEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Raw entry count, stale entries included
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        let expired = entries
            .values()
            .filter(|entry| entry.stored_at.elapsed() >= self.ttl)
            .count();

        CacheStats {
            total: entries.len(),
            expired,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedEntry<V>>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
