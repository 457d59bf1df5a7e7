//! Per-domain registry of layer state.

use crate::layer::types::{Domain, LayerCache};
use std::collections::HashMap;

/// State held for one named layer.
///
/// Created at registry initialization, mutated only by the
/// [`crate::layer::LayerController`], and never destroyed during a session.
#[derive(Debug, Clone, Default)]
pub struct LayerEntry {
    /// Currently shown on the map.
    pub visible: bool,
    /// Tri-state fetch result.
    pub cache: LayerCache,
    /// True once markers were built for the current `Loaded` cache
    /// generation; only reset by [`LayerRegistry::invalidate`].
    pub markers_built: bool,
}

/// Holds the [`LayerEntry`] for every named layer of one domain.
#[derive(Debug)]
pub struct LayerRegistry {
    domain: Domain,
    entries: HashMap<&'static str, LayerEntry>,
}

impl LayerRegistry {
    /// Creates a registry with an initial entry for every layer the domain
    /// names.
    pub fn new(domain: Domain) -> Self {
        let entries = domain
            .layers()
            .iter()
            .map(|name| (*name, LayerEntry::default()))
            .collect();
        Self { domain, entries }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Looks up a layer entry, `None` for names this domain does not own.
    pub fn get(&self, layer: &str) -> Option<&LayerEntry> {
        self.entries.get(layer)
    }

    pub fn get_mut(&mut self, layer: &str) -> Option<&mut LayerEntry> {
        self.entries.get_mut(layer)
    }

    /// Names of currently visible layers.
    pub fn visible_layers(&self) -> Vec<&'static str> {
        let mut layers: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, e)| e.visible)
            .map(|(name, _)| *name)
            .collect();
        layers.sort_unstable();
        layers
    }

    /// Aggregate "all layers" checkbox state.
    ///
    /// Layers whose cache is `Failed` are excluded from the computation;
    /// checked iff every non-failed layer is visible and at least one
    /// non-failed layer exists.
    pub fn all_checked(&self) -> bool {
        let mut any_available = false;
        for entry in self.entries.values() {
            if entry.cache.is_failed() {
                continue;
            }
            any_available = true;
            if !entry.visible {
                return false;
            }
        }
        any_available
    }

    /// Layers the aggregate toggle should flip to reach the target state.
    ///
    /// Mirrors the check/uncheck-all behavior: if any non-failed layer is
    /// off, the target is "all on" and the returned set is the off layers;
    /// otherwise the target is "all off" and the set is the on layers.
    pub fn aggregate_toggle_set(&self) -> Vec<&'static str> {
        let should_check = self
            .entries
            .values()
            .any(|e| !e.cache.is_failed() && !e.visible);
        let mut layers: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, e)| !e.cache.is_failed() && e.visible != should_check)
            .map(|(name, _)| *name)
            .collect();
        layers.sort_unstable();
        layers
    }

    /// Resets a layer to its initial state, forcing a fresh fetch and marker
    /// build on the next activation.
    pub fn invalidate(&mut self, layer: &str) {
        if let Some(entry) = self.entries.get_mut(layer) {
            *entry = LayerEntry::default();
        }
    }
}
