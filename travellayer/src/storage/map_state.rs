//! Persisted map view state and user preferences.

use crate::coord::LatLng;
use crate::storage::{KvStore, StorageError};
use crate::time::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Storage key of the persisted map view state.
pub const MAP_STATE_KEY: &str = "mapState";

/// Storage key of the opaque user preferences blob.
pub const USER_PREFS_KEY: &str = "userPreferences";

/// Map view state older than this is treated as absent on load.
pub const MAP_STATE_MAX_AGE_HOURS: i64 = 24;

/// Snapshot of the map viewport and layer visibility, stamped on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapViewState {
    pub center: LatLng,
    pub zoom: u8,
    pub active_layers: HashMap<String, bool>,
    pub timestamp: i64,
}

/// Persists map view state and preferences over a [`KvStore`].
///
/// Every failure path degrades to a silent no-op; a session without working
/// storage simply starts from defaults.
pub struct StateStore {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl StateStore {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Saves the current viewport and layer visibility, stamped with now.
    pub fn save_map_state(&self, center: LatLng, zoom: u8, active_layers: HashMap<String, bool>) {
        let state = MapViewState {
            center,
            zoom,
            active_layers,
            timestamp: self.clock.now_ms(),
        };
        match serde_json::to_string(&state) {
            Ok(serialized) => {
                if let Err(e) = self.store.set(MAP_STATE_KEY, &serialized) {
                    debug!(error = %e, "failed to save map state");
                }
            }
            Err(e) => debug!(error = %e, "failed to serialize map state"),
        }
    }

    /// Loads the persisted view state.
    ///
    /// A record older than [`MAP_STATE_MAX_AGE_HOURS`] is removed and
    /// treated as absent.
    pub fn load_map_state(&self) -> Option<MapViewState> {
        let raw = self.read(MAP_STATE_KEY)?;
        let state: MapViewState = match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                debug!(error = %e, "malformed map state dropped");
                let _ = self.store.remove(MAP_STATE_KEY);
                return None;
            }
        };

        let max_age_ms = MAP_STATE_MAX_AGE_HOURS * 60 * 60 * 1000;
        if self.clock.now_ms() - state.timestamp > max_age_ms {
            debug!("map state expired");
            let _ = self.store.remove(MAP_STATE_KEY);
            return None;
        }
        Some(state)
    }

    /// Saves the opaque preferences blob. No expiration.
    pub fn save_preferences(&self, preferences: &Value) {
        match serde_json::to_string(preferences) {
            Ok(serialized) => {
                if let Err(e) = self.store.set(USER_PREFS_KEY, &serialized) {
                    debug!(error = %e, "failed to save preferences");
                }
            }
            Err(e) => debug!(error = %e, "failed to serialize preferences"),
        }
    }

    pub fn load_preferences(&self) -> Option<Value> {
        let raw = self.read(USER_PREFS_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(raw) => raw,
            Err(StorageError::Unavailable) => None,
            Err(e) => {
                debug!(key, error = %e, "storage read failed");
                None
            }
        }
    }
}
