//! File access for the summary cache
//!
//! Provides a `CacheStore` that reads and writes the whole cache table as a
//! single JSON object. There is no locking; the last writer wins.

use directories::BaseDirs;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{CacheEntry, CacheError, CacheKey, CacheTable};

/// Name of the cache file inside the home directory
pub const CACHE_FILE_NAME: &str = ".wikr_cache.json";

/// Returns `~/.wikr_cache.json`, or `.wikr_cache.json` in the working
/// directory when no home directory can be determined.
pub fn default_cache_path() -> PathBuf {
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(CACHE_FILE_NAME),
        None => PathBuf::from(CACHE_FILE_NAME),
    }
}

/// Reads and writes the cache file
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Location of the cache file
    path: PathBuf,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    /// Creates a store for the default cache file in the home directory
    pub fn new() -> Self {
        Self {
            path: default_cache_path(),
        }
    }

    /// Creates a store for a custom cache file
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the full table
    ///
    /// Never fails: a missing or unreadable file gives an empty table, and
    /// entries that do not have the expected shape are skipped while the rest
    /// of the file is kept.
    pub fn load(&self) -> CacheTable {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    debug!("Error reading cache file {}: {}", self.path.display(), e);
                }
                return CacheTable::new();
            }
        };

        let raw: Map<String, Value> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Error decoding cache file {}: {}", self.path.display(), e);
                return CacheTable::new();
            }
        };

        let mut table = CacheTable::new();
        for (raw_key, raw_entry) in raw {
            let key = match raw_key.parse::<CacheKey>() {
                Ok(key) => key,
                Err(reason) => {
                    debug!("Skipping cache entry: {}", reason);
                    continue;
                }
            };
            match serde_json::from_value::<CacheEntry>(raw_entry) {
                Ok(entry) => {
                    table.insert(key, entry);
                }
                Err(e) => debug!("Skipping malformed cache entry '{}': {}", raw_key, e),
            }
        }
        table
    }

    /// Writes the full table, replacing the previous file contents
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(CacheError)` if directory creation, encoding or writing fails
    pub fn save(&self, table: &CacheTable) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let sorted: BTreeMap<String, &CacheEntry> = table
            .iter()
            .map(|(key, entry)| (key.to_string(), entry))
            .collect();
        let json = serde_json::to_string_pretty(&sorted)?;

        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Deletes the cache file; a file that does not exist is not an error
    pub fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Cache file {} deleted", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io(e)),
        }
    }
}
