//! Marker sink abstraction and chunked marker construction.
//!
//! The map widget is an external collaborator; the engine only decides
//! *when* markers are built, shown, or hidden. Implementations tag every
//! marker with its layer name so whole layers can be shown or hidden
//! without rebuilding.

use crate::layer::Feature;
use std::time::Duration;
use tracing::trace;

/// Number of markers materialized per cooperative batch.
const BATCH_SIZE: usize = 100;

/// Yield between batches so a large feature set does not starve the
/// event loop.
const BATCH_DELAY: Duration = Duration::from_millis(1);

/// Receiver of marker lifecycle operations.
pub trait MarkerSink: Send + Sync {
    /// Materializes one marker for a feature, tagged with its layer.
    fn add_marker(&self, layer: &str, feature: &Feature);

    /// Shows all previously built markers tagged with the layer.
    fn show_layer(&self, layer: &str);

    /// Hides all markers tagged with the layer.
    fn hide_layer(&self, layer: &str);
}

/// Marker sink that discards everything. Useful for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMarkerSink;

impl MarkerSink for NoOpMarkerSink {
    fn add_marker(&self, _layer: &str, _feature: &Feature) {}
    fn show_layer(&self, _layer: &str) {}
    fn hide_layer(&self, _layer: &str) {}
}

/// Builds markers for every feature in array order, batch by batch.
///
/// Processing is cooperative, not parallel: each batch of [`BATCH_SIZE`]
/// markers is followed by a minimal sleep that yields the event loop, so
/// ordering is preserved while the UI stays responsive.
pub async fn add_markers_chunked(sink: &dyn MarkerSink, layer: &str, features: &[Feature]) {
    for (index, batch) in features.chunks(BATCH_SIZE).enumerate() {
        for feature in batch {
            sink.add_marker(layer, feature);
        }
        trace!(layer, batch = index, size = batch.len(), "marker batch built");
        if (index + 1) * BATCH_SIZE < features.len() {
            tokio::time::sleep(BATCH_DELAY).await;
        }
    }
}
