//! Verdict cache keyed by `"{fingerprint}:{kind}"`.
//!
//! Entries carry the [`Instant`] they were written, read from the injected [`Clock`]. A lookup
//! classifies the entry by age: inside the cooldown it is served without a remote call, past the
//! TTL it is evicted and never returned. moka's own TTL bounds memory; the clock-based age check
//! is what callers observe.
//!
//! [`Clock`]: crate::clock::Clock

use std::time::{Duration, Instant};

use moka::sync::Cache;

use crate::clock::SharedClock;
use crate::evidence::EvidenceRecord;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_COOLDOWN_SECS: u64 = 15;
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub timestamp: Instant,
    pub value: EvidenceRecord,
}

/// Classification of a cache probe.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Younger than the cooldown: serve it.
    Fresh(CacheEntry),
    /// Within TTL but past the cooldown: a new review may be attempted.
    Stale(CacheEntry),
    Miss,
}

impl CacheLookup {
    pub fn fresh(self) -> Option<CacheEntry> {
        match self {
            CacheLookup::Fresh(entry) => Some(entry),
            _ => None,
        }
    }
}

pub struct VerdictCache {
    entries: Cache<String, CacheEntry>,
    ttl: Duration,
    cooldown: Duration,
    clock: SharedClock,
}

impl std::fmt::Debug for VerdictCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerdictCache")
            .field("entries", &self.entries.entry_count())
            .field("ttl", &self.ttl)
            .field("cooldown", &self.cooldown)
            .finish()
    }
}

impl VerdictCache {
    pub fn new(capacity: u64, ttl: Duration, cooldown: Duration, clock: SharedClock) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            ttl,
            cooldown,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Probes `key`, evicting the entry if it has outlived the TTL.
    pub fn lookup(&self, key: &str) -> CacheLookup {
        let Some(entry) = self.entries.get(key) else {
            return CacheLookup::Miss;
        };

        let age = self.age_of(&entry);
        if age >= self.ttl {
            self.entries.invalidate(key);
            CacheLookup::Miss
        } else if age < self.cooldown {
            CacheLookup::Fresh(entry)
        } else {
            CacheLookup::Stale(entry)
        }
    }

    /// Returns the entry if it is still within TTL, without evicting anything.
    pub fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.entries
            .get(key)
            .filter(|entry| self.age_of(entry) < self.ttl)
    }

    /// Stores `value` under `key`, stamped with the current clock time.
    pub fn insert(&self, key: &str, value: EvidenceRecord) -> CacheEntry {
        let entry = CacheEntry {
            key: key.to_string(),
            timestamp: self.clock.now(),
            value,
        };
        self.entries.insert(key.to_string(), entry.clone());
        entry
    }

    pub fn remove(&self, key: &str) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    #[inline]
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Flushes moka's pending maintenance so `len` is accurate.
    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }

    fn age_of(&self, entry: &CacheEntry) -> Duration {
        self.clock.now().saturating_duration_since(entry.timestamp)
    }
}
