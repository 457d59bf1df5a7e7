//! Pluggable layer module registry.
//!
//! Optional capabilities are modeled as present-or-absent function members
//! in a typed registration record, checked with ordinary `Option` handling
//! rather than reflection over method names.

use crate::storage::MapViewState;
use serde_json::Value;
use std::sync::Mutex;
use tracing::debug;

/// Hook invoked when the map viewport settles after a move.
pub type MapMoveEndHook = Box<dyn Fn(&MapViewState) + Send + Sync>;

/// Hook invoked when a module's settings are updated.
pub type SettingsUpdatedHook = Box<dyn Fn(&Value) + Send + Sync>;

/// Optional capabilities of a module.
#[derive(Default)]
pub struct ModuleHooks {
    pub on_map_move_end: Option<MapMoveEndHook>,
    pub on_settings_updated: Option<SettingsUpdatedHook>,
}

/// A registered module: identifier plus its optional hooks.
pub struct ModuleRegistration {
    pub id: String,
    pub hooks: ModuleHooks,
}

/// Holds every registered module and fans events out to their hooks.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Mutex<Vec<ModuleRegistration>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module, replacing any previous registration with the
    /// same identifier.
    pub fn register(&self, registration: ModuleRegistration) {
        let mut modules = self.modules.lock().unwrap();
        modules.retain(|m| m.id != registration.id);
        debug!(module = %registration.id, "module registered");
        modules.push(registration);
    }

    pub fn ids(&self) -> Vec<String> {
        self.modules
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.id.clone())
            .collect()
    }

    /// Notifies every module that implements the map-move-end capability.
    pub fn notify_map_move_end(&self, state: &MapViewState) {
        for module in self.modules.lock().unwrap().iter() {
            if let Some(hook) = &module.hooks.on_map_move_end {
                hook(state);
            }
        }
    }

    /// Notifies one module of a settings update, if it cares.
    pub fn notify_settings_updated(&self, module_id: &str, settings: &Value) {
        for module in self.modules.lock().unwrap().iter() {
            if module.id == module_id {
                if let Some(hook) = &module.hooks.on_settings_updated {
                    hook(settings);
                }
            }
        }
    }
}
