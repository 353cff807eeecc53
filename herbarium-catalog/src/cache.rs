//! Single-slot persistence for the last fetched catalogue payload.
//!
//! The cache holds at most one record: the serialized payload text and the
//! instant the fetch that produced it completed. Records are replaced whole,
//! never partially updated. Writes take a file lock; reads are lock-free.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fslock::LockFile;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::CacheError;

/// Bumped whenever the record layout changes. A stored record with a
/// different version is treated as absent, not as an error.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

const CACHE_FILE_NAME: &str = "catalogue-cache.json";

/// The persisted cache unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub version: u32,
    /// Wall-clock instant the fetch that produced this payload completed.
    #[serde(with = "time::serde::iso8601")]
    pub fetched_at: OffsetDateTime,
    /// Serialized payload text, decoded on demand by the sync layer.
    pub payload: String,
}

impl CacheRecord {
    /// Pure freshness predicate: `now - fetched_at < ttl`, strictly.
    /// A record exactly `ttl` old is stale.
    pub fn is_fresh(&self, now: OffsetDateTime, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}

/// File-backed single-slot cache for the catalogue payload.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    record_path: PathBuf,
}

impl CatalogCache {
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            record_path: cache_dir.as_ref().join(CACHE_FILE_NAME),
        }
    }

    /// Returns the last stored record, or [`None`] if no record exists or
    /// the stored record carries a different schema version.
    pub fn get(&self) -> Result<Option<CacheRecord>, CacheError> {
        if !self.record_path.exists() {
            return Ok(None);
        }

        let record_str = fs::read_to_string(&self.record_path).map_err(CacheError::Read)?;
        let record: CacheRecord =
            serde_json::from_str(&record_str).map_err(CacheError::Deserialize)?;

        if record.version != CACHE_SCHEMA_VERSION {
            debug!(
                found = record.version,
                expected = CACHE_SCHEMA_VERSION,
                "discarding cache record with mismatched schema version"
            );
            return Ok(None);
        }

        Ok(Some(record))
    }

    /// Overwrites any existing record with `payload` fetched at `fetched_at`.
    pub fn put(&self, payload: &str, fetched_at: OffsetDateTime) -> Result<(), CacheError> {
        if let Some(parent) = self.record_path.parent() {
            fs::create_dir_all(parent).map_err(CacheError::Write)?;
        }

        let _lock = acquire_lock(&self.record_path)?;

        let record = CacheRecord {
            version: CACHE_SCHEMA_VERSION,
            fetched_at,
            payload: payload.to_string(),
        };
        let record_str = serde_json::to_string(&record).map_err(CacheError::Serialize)?;
        fs::write(&self.record_path, record_str).map_err(CacheError::Write)?;

        debug!(record_path=?self.record_path, bytes = payload.len(), "wrote catalogue cache record");
        Ok(())
    }
}

/// Blocks until the cache file lock is held.
fn acquire_lock(record_path: &Path) -> Result<LockFile, CacheError> {
    let lock_path = record_path.with_extension("lock");
    let mut lock = LockFile::open(&lock_path).map_err(CacheError::Lock)?;
    lock.lock().map_err(CacheError::Lock)?;
    Ok(lock)
}
