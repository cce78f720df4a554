//! JSON-file-backed result cache.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde_json::Value;
use thiserror::Error;

use super::entry::{AssetInfo, CacheRecord, CacheStats};
use crate::fsio;

/// Errors from the result cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file is not a JSON object. Recovered by starting empty.
    #[error("cache file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The cache file exists but could not be read.
    #[error("failed to read cache file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Creating the cache directory or writing the file failed.
    #[error("failed to write cache file {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The in-memory map could not be serialized.
    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Map from GUID to lookup outcome, persisted as one JSON object.
///
/// There is no locking: concurrent writers from several processes are
/// last-writer-wins, and every read or mutation first re-reads the file if its
/// mtime moved past the one recorded at the last load.
#[derive(Debug)]
pub struct ResultCache {
    path: PathBuf,
    records: BTreeMap<String, CacheRecord>,
    loaded_at: Option<SystemTime>,
}

impl ResultCache {
    /// Create a cache backed by `path`.
    ///
    /// Nothing is read until the first access; a missing file is an empty cache.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
            loaded_at: None,
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time of the backing file, if it exists.
    #[must_use]
    pub fn last_modified(&self) -> Option<SystemTime> {
        fsio::modified(&self.path)
    }

    /// Re-read the backing file if it changed since the last load.
    ///
    /// A missing file empties the cache. A corrupt or unreadable one is logged
    /// and treated as empty; it is overwritten by the next mutation. Returns
    /// whether the in-memory state was replaced.
    pub fn reload_if_changed(&mut self) -> bool {
        let current = fsio::modified(&self.path);
        if !fsio::is_newer(current, self.loaded_at) {
            return false;
        }

        self.records = match current {
            Some(_) => match read_records(&self.path) {
                Ok(records) => {
                    log::debug!(
                        "Loaded {} cache entries from {}",
                        records.len(),
                        self.path.display()
                    );
                    records
                }
                Err(e) => {
                    log::warn!("{e}; starting with an empty cache");
                    BTreeMap::new()
                }
            },
            None => {
                log::debug!("Cache file {} removed", self.path.display());
                BTreeMap::new()
            }
        };
        self.loaded_at = current;
        true
    }

    /// Stored record for `key`, or `None` if it was never looked up.
    pub fn get(&mut self, key: &str) -> Option<CacheRecord> {
        self.reload_if_changed();
        self.records.get(key).cloned()
    }

    /// Whether `key` is recorded as searched-and-missing.
    pub fn is_not_found(&mut self, key: &str) -> bool {
        self.get(key).is_some_and(|r| r.is_not_found())
    }

    /// Record a found asset under `key`.
    pub fn put_found(&mut self, key: &str, asset: AssetInfo) -> CacheResult<()> {
        self.mutate(|records| {
            records.insert(key.to_string(), CacheRecord::Found(asset));
        })
    }

    /// Record that `key` does not exist.
    pub fn put_not_found(&mut self, key: &str) -> CacheResult<()> {
        self.mutate(|records| {
            records.insert(key.to_string(), CacheRecord::NotFound);
        })
    }

    /// Record many found assets in one write, keyed by their GUID.
    ///
    /// Existing `Found` records are kept; `NotFound` markers are replaced.
    /// Returns how many records were added or upgraded.
    pub fn extend_found<I>(&mut self, assets: I) -> CacheResult<usize>
    where
        I: IntoIterator<Item = AssetInfo>,
    {
        self.mutate(|records| {
            let mut added = 0;
            for asset in assets {
                let is_known = records.get(&asset.guid).is_some_and(CacheRecord::is_found);
                if !is_known {
                    records.insert(asset.guid.clone(), CacheRecord::Found(asset));
                    added += 1;
                }
            }
            added
        })
    }

    /// Drop every `NotFound` marker. Returns how many were removed.
    pub fn clear_not_found(&mut self) -> CacheResult<usize> {
        self.mutate(|records| {
            let before = records.len();
            records.retain(|_, record| record.is_found());
            before - records.len()
        })
    }

    /// Drop everything and write an empty object.
    pub fn clear_all(&mut self) -> CacheResult<()> {
        self.mutate(BTreeMap::clear)
    }

    /// Record counts, after a reload check.
    pub fn stats(&mut self) -> CacheStats {
        self.reload_if_changed();
        let found = self.records.values().filter(|r| r.is_found()).count();
        CacheStats {
            found,
            not_found: self.records.len() - found,
            total: self.records.len(),
        }
    }

    /// Apply `f` to a copy of the records and persist it.
    ///
    /// The in-memory map only changes once the write succeeded.
    fn mutate<F, R>(&mut self, f: F) -> CacheResult<R>
    where
        F: FnOnce(&mut BTreeMap<String, CacheRecord>) -> R,
    {
        self.reload_if_changed();

        let mut next = self.records.clone();
        let out = f(&mut next);
        self.write(&next)?;
        self.records = next;
        Ok(out)
    }

    fn write(&mut self, records: &BTreeMap<String, CacheRecord>) -> CacheResult<()> {
        let content = serde_json::to_vec_pretty(records)?;
        fsio::write_atomic(&self.path, &content).map_err(|source| CacheError::FileSystem {
            path: self.path.clone(),
            source,
        })?;

        // Our own write must not look like an external change.
        self.loaded_at = fsio::modified(&self.path);
        log::debug!(
            "Wrote {} cache entries to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn read_records(path: &Path) -> CacheResult<BTreeMap<String, CacheRecord>> {
    let content = fs::read_to_string(path).map_err(|source| CacheError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document: BTreeMap<String, Value> =
        serde_json::from_str(&content).map_err(|source| CacheError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = BTreeMap::new();
    for (key, value) in document {
        match CacheRecord::decode(value) {
            Some(record) => {
                records.insert(key, record);
            }
            None => log::warn!("Skipping unreadable cache entry '{}'", key),
        }
    }
    Ok(records)
}
