//! Overlay layer state machine.
//!
//! Each data domain (road conditions, current weather, forecast weather,
//! fire, other info) owns a [`LayerRegistry`] holding per-layer visibility,
//! a tri-state fetch cache, and a marker-generation flag. The shared
//! [`LayerController`] drives the cache-and-toggle protocol over one
//! registry: first activation fetches, first loaded activation builds
//! markers once, every later activation is a cheap visibility flip.
//!
//! The protocol guarantees at most one fetch per layer per session and at
//! most one marker-build pass per cache generation. A failed fetch parks the
//! layer in a `Failed` state that is never retried automatically.

mod controller;
mod feature;
mod loader;
mod registry;
mod types;

pub use controller::{LayerController, ToggleOutcome};
pub use feature::{normalize_payload, Feature, FeatureAttrs};
pub use loader::{LayerLoader, LoadError, RemoteLayerLoader};
pub use registry::{LayerEntry, LayerRegistry};
pub use types::{Domain, LayerCache};
