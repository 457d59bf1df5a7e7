//! Persistent key-value storage.
//!
//! Models the capacity-limited, possibly unavailable client-side store the
//! dashboard persists into. All higher-level persistence (credential record,
//! cached payloads, map view state, settings) goes through the [`KvStore`]
//! seam; when the store is unavailable, callers degrade to silent no-ops and
//! the session runs in-memory only.

mod cache;
mod map_state;

pub use cache::PayloadCache;
pub use map_state::{MapViewState, StateStore, MAP_STATE_KEY, MAP_STATE_MAX_AGE_HOURS, USER_PREFS_KEY};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

/// Storage-related errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    /// Persistent store inaccessible.
    #[error("persistent storage unavailable")]
    Unavailable,

    /// Write rejected because the capacity limit was reached.
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// Backend I/O failure.
    #[error("storage I/O failure: {0}")]
    Io(String),
}

/// Synchronous string key-value store.
///
/// Writes are last-writer-wins; there is no transactional guarantee across
/// keys.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Write/remove round-trip probe for store availability.
///
/// Mirrors the dashboard's startup storage check: a store that cannot
/// complete the probe is treated as absent for the whole session.
pub fn probe(store: &dyn KvStore) -> bool {
    const PROBE_KEY: &str = "__storage_test__";
    let available = store.set(PROBE_KEY, PROBE_KEY).is_ok() && store.remove(PROBE_KEY).is_ok();
    if !available {
        debug!("storage probe failed, running without persistence");
    }
    available
}

/// In-memory store with an optional capacity limit.
///
/// The default backend for tests and in-memory sessions. `capacity_bytes`
/// bounds the total size of stored keys and values, modeling quota errors.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    capacity_bytes: Option<usize>,
    unavailable: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity_bytes: None,
            unavailable: Mutex::new(false),
        }
    }

    pub fn with_capacity_bytes(capacity_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity_bytes: Some(capacity_bytes),
            unavailable: Mutex::new(false),
        }
    }

    /// Makes every subsequent operation fail, simulating a storage outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if *self.unavailable.lock().unwrap() {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn used_bytes(entries: &HashMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if let Some(capacity) = self.capacity_bytes {
            let existing = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let after = Self::used_bytes(&entries) - existing + key.len() + value.len();
            if after > capacity {
                return Err(StorageError::QuotaExceeded);
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

/// File-backed store persisting the whole map as one JSON document.
///
/// Used by the CLI so state survives across invocations. Every write
/// rewrites the file; the data volumes involved are tiny.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens or creates the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| StorageError::Io(format!("corrupt store file: {}", e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let contents =
            serde_json::to_string_pretty(entries).map_err(|e| StorageError::Io(e.to_string()))?;
        std::fs::write(&self.path, contents).map_err(|e| StorageError::Io(e.to_string()))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        self.flush(&entries)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        entries.clear();
        self.flush(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn memory_store_enforces_quota() {
        let store = MemoryStore::with_capacity_bytes(8);
        store.set("ab", "cd").unwrap();
        assert_eq!(
            store.set("ef", "too long for quota"),
            Err(StorageError::QuotaExceeded)
        );
        // Overwriting within the budget is fine.
        store.set("ab", "xyzw").unwrap();
    }

    #[test]
    fn unavailable_store_fails_probe() {
        let store = MemoryStore::new();
        assert!(probe(&store));
        store.set_unavailable(true);
        assert!(!probe(&store));
        assert_eq!(store.get("a"), Err(StorageError::Unavailable));
    }

    #[test]
    fn file_store_persists_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        {
            let store = FileStore::open(&path).unwrap();
            store.set("mapState", "{\"zoom\":8}").unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(
            store.get("mapState").unwrap().as_deref(),
            Some("{\"zoom\":8}")
        );
    }

    #[test]
    fn file_store_clear_empties_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.set("a", "1").unwrap();
        store.clear().unwrap();
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }
}
