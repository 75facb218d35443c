use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::time::Instant;

use crate::models::{CachedHealth, HealthState, ResourceHealth, ResourceKey};

/// Shared status store. One lock covers both the cached entries and the set
/// of keys with an active monitor, so a spawn decision can never race a
/// concurrent write on the same key.
#[derive(Clone, Default)]
pub struct StatusCache {
    inner: Arc<Mutex<CacheInner>>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<ResourceKey, CachedHealth>,
    active: HashSet<ResourceKey>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: &ResourceKey) -> Option<CachedHealth> {
        self.lock().entries.get(key).cloned()
    }

    pub fn put(&self, key: ResourceKey, entry: CachedHealth) {
        self.lock().entries.insert(key, entry);
    }

    /// Zero both counters in place, keeping status and timestamp. Returns
    /// false when the key has no entry.
    pub fn reset_counters(&self, key: &ResourceKey) -> bool {
        match self.lock().entries.get_mut(key) {
            Some(entry) => {
                entry.consecutive_healthy = 0;
                entry.consecutive_not_found = 0;
                true
            }
            None => false,
        }
    }

    /// Mark a monitor active for the key. Returns false when one already is.
    pub(crate) fn try_claim(&self, key: &ResourceKey) -> bool {
        self.lock().active.insert(key.clone())
    }

    pub(crate) fn release(&self, key: &ResourceKey) {
        self.lock().active.remove(key);
    }

    /// Count one failing poll. Counts in the entry when one exists so the
    /// streak survives monitor sessions and stays resettable; before the
    /// first write the monitor-local count carries it. Returns the new
    /// streak either way.
    pub(crate) fn bump_not_found(&self, key: &ResourceKey, local: u32) -> u32 {
        match self.lock().entries.get_mut(key) {
            Some(entry) => {
                entry.consecutive_not_found += 1;
                entry.consecutive_not_found
            }
            None => local + 1,
        }
    }

    /// Publish a completed pass: store the health with a fresh timestamp,
    /// clear the not-found streak, and advance the healthy streak (cleared
    /// again by any non-ready publish). Returns the healthy streak.
    pub(crate) fn publish(&self, key: &ResourceKey, health: ResourceHealth) -> u32 {
        let ready = health.status == HealthState::Ready;
        let mut inner = self.lock();
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.health = health;
                entry.captured_at = Instant::now();
                entry.consecutive_not_found = 0;
                entry.consecutive_healthy = if ready {
                    entry.consecutive_healthy + 1
                } else {
                    0
                };
                entry.consecutive_healthy
            }
            None => {
                let mut entry = CachedHealth::new(health);
                entry.consecutive_healthy = u32::from(ready);
                let streak = entry.consecutive_healthy;
                inner.entries.insert(key.clone(), entry);
                streak
            }
        }
    }

    /// Publish the terminal not-found failure. The entry is written fresh
    /// with zeroed counters, so any later monitor session starts with a
    /// full escalation window.
    pub(crate) fn publish_failure(&self, key: &ResourceKey, health: ResourceHealth) {
        self.lock()
            .entries
            .insert(key.clone(), CachedHealth::new(health));
    }
}
