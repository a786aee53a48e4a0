// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TTL byte cache keyed by canonical URI.
//!
//! Owned by the dispatch run and shared by clone; there is no module-level
//! state, so tests inject a fresh cache and a fake clock.

use parking_lot::Mutex;
use relay_core::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

struct Entry {
    bytes: Vec<u8>,
    inserted_at_ms: u64,
}

/// Shared byte cache with per-insert TTL.
#[derive(Clone)]
pub struct ResourceCache<C: Clock> {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    ttl: Duration,
    clock: C,
}

impl<C: Clock> ResourceCache<C> {
    pub fn new(ttl: Duration, clock: C) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// Fetch a live entry; expired entries are evicted on access.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = self.clock.epoch_ms();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if now < entry.inserted_at_ms + self.ttl.as_millis() as u64 => {
                Some(entry.bytes.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, bytes: Vec<u8>) {
        let inserted_at_ms = self.clock.epoch_ms();
        self.entries.lock().insert(
            key,
            Entry {
                bytes,
                inserted_at_ms,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
