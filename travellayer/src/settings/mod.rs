//! Per-module settings registry.
//!
//! Modules register a descriptor of their configurable fields; settings are
//! stored as one JSON blob under a fixed key. The registry is an explicit
//! object handed to every consumer (dependency injection), not a
//! process-wide singleton.

use crate::storage::KvStore;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Fixed storage key of the settings blob.
pub const SETTINGS_KEY: &str = "travellayer_settings";

/// Kind of a configurable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Checkbox,
}

/// One configurable field of a module.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub title: String,
    pub kind: FieldKind,
    pub required: bool,
}

/// Registration record describing a module's settings surface.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    pub id: String,
    pub title: String,
    pub description: String,
    pub fields: Vec<FieldDescriptor>,
}

struct Inner {
    settings: Map<String, Value>,
    modules: Vec<ModuleDescriptor>,
}

/// Registry of module settings, persisted as a whole on every update.
///
/// Persistence failures degrade silently; the registry keeps serving the
/// in-memory state for the rest of the session.
pub struct SettingsRegistry {
    store: Arc<dyn KvStore>,
    inner: Mutex<Inner>,
}

impl SettingsRegistry {
    /// Creates the registry, loading any persisted settings blob.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let settings = match store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Value>(&raw)
                .ok()
                .and_then(|v| v.as_object().cloned())
                .unwrap_or_default(),
            Ok(None) => Map::new(),
            Err(e) => {
                debug!(error = %e, "settings load failed, starting empty");
                Map::new()
            }
        };
        Self {
            store,
            inner: Mutex::new(Inner {
                settings,
                modules: Vec::new(),
            }),
        }
    }

    /// Registers (or replaces) a module's settings descriptor.
    pub fn register_module(&self, descriptor: ModuleDescriptor) {
        let mut inner = self.inner.lock().unwrap();
        inner.modules.retain(|m| m.id != descriptor.id);
        inner.modules.push(descriptor);
    }

    /// All registered module descriptors.
    pub fn modules(&self) -> Vec<ModuleDescriptor> {
        self.inner.lock().unwrap().modules.clone()
    }

    /// Current settings object of a module; empty object when unset.
    pub fn module_settings(&self, module_id: &str) -> Value {
        self.inner
            .lock()
            .unwrap()
            .settings
            .get(module_id)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Merges an update into a module's settings and persists the blob.
    ///
    /// Returns the module's settings after the merge.
    pub fn update_module_settings(&self, module_id: &str, update: Value) -> Value {
        let mut inner = self.inner.lock().unwrap();
        let current = inner
            .settings
            .entry(module_id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        match (current.as_object_mut(), update.as_object()) {
            (Some(current), Some(update)) => {
                for (key, value) in update {
                    current.insert(key.clone(), value.clone());
                }
            }
            _ => *current = update,
        }
        let result = current.clone();

        match serde_json::to_string(&Value::Object(inner.settings.clone())) {
            Ok(serialized) => {
                if let Err(e) = self.store.set(SETTINGS_KEY, &serialized) {
                    debug!(error = %e, "settings save failed");
                }
            }
            Err(e) => debug!(error = %e, "settings serialize failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn registry() -> (SettingsRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let registry = SettingsRegistry::new(Arc::clone(&store) as Arc<dyn KvStore>);
        (registry, store)
    }

    fn descriptor(id: &str) -> ModuleDescriptor {
        ModuleDescriptor {
            id: id.to_string(),
            title: "EV Charging Stations".to_string(),
            description: String::new(),
            fields: vec![FieldDescriptor {
                name: "apiKey".to_string(),
                title: "API Key".to_string(),
                kind: FieldKind::Text,
                required: true,
            }],
        }
    }

    #[test]
    fn unset_module_settings_are_an_empty_object() {
        let (registry, _) = registry();
        assert_eq!(registry.module_settings("evcharging"), json!({}));
    }

    #[test]
    fn updates_merge_and_persist() {
        let (registry, store) = registry();
        registry.update_module_settings("evcharging", json!({"enabled": true}));
        registry.update_module_settings("evcharging", json!({"apiKey": "k"}));

        assert_eq!(
            registry.module_settings("evcharging"),
            json!({"enabled": true, "apiKey": "k"})
        );

        // A fresh registry sees the persisted blob.
        let reloaded = SettingsRegistry::new(store as Arc<dyn KvStore>);
        assert_eq!(
            reloaded.module_settings("evcharging"),
            json!({"enabled": true, "apiKey": "k"})
        );
    }

    #[test]
    fn reregistration_replaces_descriptor() {
        let (registry, _) = registry();
        registry.register_module(descriptor("evcharging"));
        registry.register_module(descriptor("evcharging"));
        assert_eq!(registry.modules().len(), 1);
    }

    #[test]
    fn unavailable_store_keeps_in_memory_state() {
        let (registry, store) = registry();
        store.set_unavailable(true);
        registry.update_module_settings("evcharging", json!({"enabled": true}));
        assert_eq!(
            registry.module_settings("evcharging"),
            json!({"enabled": true})
        );
    }
}
