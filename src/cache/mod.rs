//! Cache module for storing article summaries on disk
//!
//! The cache is a single JSON file mapping `language:title` keys to the
//! summary, page URL and fetch time of an article. [`CacheStore`] does the
//! plain file access, [`SummaryCache`] adds the 24-hour freshness rule on top.

mod policy;
mod store;

pub use policy::{SummaryCache, CACHE_TTL_HOURS};
pub use store::{default_cache_path, CacheStore, CACHE_FILE_NAME};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when reading or writing the cache file
///
/// These never reach the user: callers log them and carry on as if the cache
/// were empty.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading, writing or deleting the file failed
    #[error("cache file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The table could not be encoded as JSON
    #[error("failed to encode cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Returns true if `language` is usable as a language edition identifier
///
/// Only ASCII alphanumerics and `-` are allowed, which keeps the value safe
/// inside a host name and guarantees it never contains the key separator.
pub fn is_valid_language(language: &str) -> bool {
    !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Identifies a cached summary by language edition and exact article title
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub language: String,
    pub title: String,
}

impl CacheKey {
    pub fn new(language: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            title: title.into(),
        }
    }
}

/// Persisted form is `language:title`
impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.language, self.title)
    }
}

impl FromStr for CacheKey {
    type Err = String;

    /// Splits at the first `:`. Languages never contain one, so any further
    /// colons belong to the title.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (language, title) = s
            .split_once(':')
            .ok_or_else(|| format!("missing ':' separator in cache key '{}'", s))?;

        if !is_valid_language(language) {
            return Err(format!("invalid language in cache key '{}'", s));
        }

        Ok(Self::new(language, title))
    }
}

/// A cached article summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Summary text, already truncated
    pub summary: String,
    /// Canonical page URL
    pub url: String,
    /// When the summary was fetched
    pub timestamp: DateTime<Utc>,
}

/// In-memory copy of the whole cache file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheTable {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl CacheTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Inserts an entry, replacing whatever was stored for the key
    pub fn insert(&mut self, key: CacheKey, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(key, entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CacheKey, &CacheEntry)> {
        self.entries.iter()
    }
}
