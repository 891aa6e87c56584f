//! Freshness rules for cached summaries

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::{CacheEntry, CacheError, CacheKey, CacheStore};

/// Time-to-live for cached summaries in hours
pub const CACHE_TTL_HOURS: i64 = 24;

/// Summary cache with a fixed 24-hour time-to-live
///
/// Every operation loads the whole table from the store and works on that
/// copy; nothing is kept in memory between calls. Expired entries stay in the
/// file until a fresh fetch for the same key overwrites them.
#[derive(Debug, Clone)]
pub struct SummaryCache {
    store: CacheStore,
    ttl: Duration,
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new(CacheStore::new())
    }
}

impl SummaryCache {
    pub fn new(store: CacheStore) -> Self {
        Self {
            store,
            ttl: Duration::hours(CACHE_TTL_HOURS),
        }
    }

    /// The file store behind this cache
    pub fn store_ref(&self) -> &CacheStore {
        &self.store
    }

    /// Returns the entry for `key` if it exists and is still fresh
    pub fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.lookup_at(key, Utc::now())
    }

    /// Same as [`lookup`](Self::lookup) with an explicit current time
    ///
    /// An entry is stale once `now - timestamp >= 24h`.
    pub fn lookup_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<CacheEntry> {
        let table = self.store.load();
        let Some(entry) = table.get(key) else {
            debug!("Cache miss for key: {}", key);
            return None;
        };

        let age = now.signed_duration_since(entry.timestamp);
        if age >= self.ttl {
            debug!("Cache entry for key {} is stale, age: {}", key, age);
            return None;
        }

        debug!("Cache hit for key {}, age: {}", key, age);
        Some(entry.clone())
    }

    /// Stores a freshly fetched summary, replacing any existing entry
    ///
    /// Reloads the table first so other keys written since the last read are
    /// kept, then writes the whole table back.
    pub fn store(
        &self,
        key: CacheKey,
        summary: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<CacheEntry, CacheError> {
        let entry = CacheEntry {
            summary: summary.into(),
            url: url.into(),
            timestamp: Utc::now(),
        };
        self.store_entry(key, entry.clone())?;
        Ok(entry)
    }

    /// Writes a prepared entry as-is
    pub fn store_entry(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        let mut table = self.store.load();
        debug!("Saving cache entry for key: {}", key);
        table.insert(key, entry);
        self.store.save(&table)
    }
}
