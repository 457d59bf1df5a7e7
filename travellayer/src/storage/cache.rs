//! Expiring cached payload envelopes.
//!
//! Each cached domain payload is stored with its write timestamp and an
//! expiration in minutes; entries older than their expiration are treated as
//! absent on read and proactively removed.

use crate::storage::{KvStore, StorageError};
use crate::time::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Default payload expiration in minutes.
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    data: Value,
    timestamp: i64,
    expiration_minutes: i64,
}

/// Cache of JSON payloads over a [`KvStore`], with per-entry expiration.
///
/// Storage failures degrade to no-ops on write and absence on read; the
/// session keeps running without persisted payloads.
pub struct PayloadCache {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl PayloadCache {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Stores a payload stamped with the current time.
    pub fn save(&self, key: &str, data: &Value, expiration_minutes: i64) {
        let envelope = Envelope {
            data: data.clone(),
            timestamp: self.clock.now_ms(),
            expiration_minutes,
        };
        let serialized = match serde_json::to_string(&envelope) {
            Ok(s) => s,
            Err(e) => {
                debug!(key, error = %e, "failed to serialize cached payload");
                return;
            }
        };
        if let Err(e) = self.store.set(key, &serialized) {
            debug!(key, error = %e, "failed to save cached payload");
        }
    }

    /// Loads a payload, treating expired or malformed entries as absent.
    ///
    /// Expired entries are removed from the store on the way out.
    pub fn load(&self, key: &str) -> Option<Value> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(StorageError::Unavailable) => return None,
            Err(e) => {
                debug!(key, error = %e, "failed to read cached payload");
                return None;
            }
        };

        let envelope: Envelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(key, error = %e, "malformed cached payload dropped");
                let _ = self.store.remove(key);
                return None;
            }
        };

        let expires_at = envelope.timestamp + envelope.expiration_minutes * 60 * 1000;
        if self.clock.now_ms() > expires_at {
            debug!(key, "cached payload expired");
            let _ = self.store.remove(key);
            return None;
        }

        Some(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::time::ManualClock;
    use serde_json::json;

    fn cache_with_clock(now_ms: i64) -> (PayloadCache, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::at(now_ms));
        let cache = PayloadCache::new(
            Arc::clone(&store) as Arc<dyn KvStore>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        (cache, store, clock)
    }

    #[test]
    fn fresh_entry_round_trips() {
        let (cache, _, _) = cache_with_clock(1_000_000);
        cache.save("payload", &json!({"a": 1}), 60);
        assert_eq!(cache.load("payload"), Some(json!({"a": 1})));
    }

    #[test]
    fn expired_entry_is_absent_and_removed() {
        let (cache, store, clock) = cache_with_clock(1_000_000);
        cache.save("payload", &json!([1, 2]), 60);

        clock.advance(61 * 60 * 1000);
        assert_eq!(cache.load("payload"), None);
        assert_eq!(store.get("payload").unwrap(), None);
    }

    #[test]
    fn entry_on_the_edge_is_still_fresh() {
        let (cache, _, clock) = cache_with_clock(0);
        cache.save("payload", &json!(true), 1);
        clock.advance(60 * 1000);
        assert!(cache.load("payload").is_some());
        clock.advance(1);
        assert!(cache.load("payload").is_none());
    }

    #[test]
    fn stored_envelope_uses_camel_case_keys() {
        let (cache, store, _) = cache_with_clock(1_000_000);
        cache.save("payload", &json!({"a": 1}), 60);

        let raw = store.get("payload").unwrap().unwrap();
        let envelope: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(envelope["expirationMinutes"], json!(60));
        assert_eq!(envelope["timestamp"], json!(1_000_000));
        assert_eq!(envelope["data"], json!({"a": 1}));
    }

    #[test]
    fn malformed_entry_is_dropped() {
        let (cache, store, _) = cache_with_clock(0);
        store.set("payload", "not json").unwrap();
        assert_eq!(cache.load("payload"), None);
        assert_eq!(store.get("payload").unwrap(), None);
    }

    #[test]
    fn unavailable_store_degrades_silently() {
        let (cache, store, _) = cache_with_clock(0);
        store.set_unavailable(true);
        cache.save("payload", &json!(1), 60);
        assert_eq!(cache.load("payload"), None);
    }
}
