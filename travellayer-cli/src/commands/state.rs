//! Persisted session state inspection.
//!
//! Shows or clears the map view state and user preferences the engine
//! persists between sessions. The encrypted credential record is left
//! untouched; use `setup` to replace it.

use std::sync::Arc;

use travellayer::storage::{FileStore, KvStore, StateStore, MAP_STATE_KEY, USER_PREFS_KEY};
use travellayer::time::SystemClock;

use crate::error::CliError;

/// Print the persisted view state and preferences.
pub fn show(store_path: &str) -> Result<(), CliError> {
    let kv = Arc::new(FileStore::open(store_path)?);
    let state = StateStore::new(kv, Arc::new(SystemClock));

    match state.load_map_state() {
        Some(view) => {
            println!("Map view:");
            println!("  center: {:.4}, {:.4}", view.center.lat, view.center.lng);
            println!("  zoom:   {}", view.zoom);
            let mut layers: Vec<_> = view
                .active_layers
                .iter()
                .filter(|(_, active)| **active)
                .map(|(name, _)| name.as_str())
                .collect();
            layers.sort_unstable();
            println!("  layers: {}", layers.join(", "));
        }
        None => println!("No saved map view (never saved, expired, or unreadable)."),
    }

    match state.load_preferences() {
        Some(prefs) => {
            println!("Preferences:");
            println!(
                "{}",
                serde_json::to_string_pretty(&prefs).unwrap_or_else(|_| prefs.to_string())
            );
        }
        None => println!("No saved preferences."),
    }

    Ok(())
}

/// Remove the persisted view state and preferences.
pub fn clear(store_path: &str) -> Result<(), CliError> {
    let kv = FileStore::open(store_path)?;
    kv.remove(MAP_STATE_KEY)?;
    kv.remove(USER_PREFS_KEY)?;
    println!("Cleared saved map view and preferences.");
    Ok(())
}
