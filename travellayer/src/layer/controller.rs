//! The shared cache-and-toggle protocol.

use crate::layer::loader::{LayerLoader, LoadError};
use crate::layer::registry::{LayerEntry, LayerRegistry};
use crate::layer::types::{Domain, LayerCache};
use crate::marker::{add_markers_chunked, MarkerSink};
use crate::notify::Notifier;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// What a call to [`LayerController::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Layer was visible; it is now hidden.
    Hidden,
    /// First activation: a fetch was started, the call returned immediately.
    FetchStarted,
    /// A fetch is already in flight; the call was a no-op.
    FetchPending,
    /// The layer's cache is failed; an error was surfaced, no retry.
    Failed,
    /// Layer is now visible (markers built or re-shown).
    Shown,
    /// The domain does not own a layer by that name.
    UnknownLayer,
}

/// Drives the toggle protocol over one domain's [`LayerRegistry`].
///
/// Per-layer state is mutated only here; the `Loading` guard state ensures
/// no two fetches run concurrently for the same layer. Across layers there
/// is no ordering guarantee.
pub struct LayerController<L, S, N> {
    registry: Mutex<LayerRegistry>,
    loader: Arc<L>,
    markers: Arc<S>,
    notifier: Arc<N>,
}

impl<L, S, N> LayerController<L, S, N>
where
    L: LayerLoader + 'static,
    S: MarkerSink + 'static,
    N: Notifier + 'static,
{
    pub fn new(domain: Domain, loader: Arc<L>, markers: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            registry: Mutex::new(LayerRegistry::new(domain)),
            loader,
            markers,
            notifier,
        }
    }

    pub fn domain(&self) -> Domain {
        self.registry.lock().unwrap().domain()
    }

    /// Single entry point of the state machine.
    ///
    /// One call doubles as "request data" and "show/hide": the first
    /// activation starts the fetch and returns without blocking, activation
    /// with loaded data builds markers exactly once, and every later call is
    /// a cheap visibility flip. A toggle on a failed layer only surfaces the
    /// error; it never issues a network request.
    pub async fn toggle(self: &Arc<Self>, layer: &str) -> ToggleOutcome {
        // Resolve to the registry's 'static name so spawned tasks can carry it.
        let Some(layer) = self.resolve(layer) else {
            warn!(layer, "toggle on unknown layer");
            return ToggleOutcome::UnknownLayer;
        };

        enum Action {
            Hide,
            Fetch(Domain),
            Pending,
            Failed,
            Activate,
        }

        let action = {
            let mut registry = self.registry.lock().unwrap();
            let domain = registry.domain();
            let entry = registry.get_mut(layer).unwrap();
            if entry.visible {
                entry.visible = false;
                Action::Hide
            } else {
                match entry.cache {
                    LayerCache::Unloaded => {
                        entry.cache = LayerCache::Loading;
                        Action::Fetch(domain)
                    }
                    LayerCache::Loading => Action::Pending,
                    LayerCache::Failed => Action::Failed,
                    LayerCache::Loaded(_) => Action::Activate,
                }
            }
        };

        match action {
            Action::Hide => {
                debug!(layer, "layer hidden");
                self.markers.hide_layer(layer);
                ToggleOutcome::Hidden
            }
            Action::Fetch(domain) => {
                info!(%domain, layer, "first activation, fetch started");
                let ctrl = Arc::clone(self);
                tokio::spawn(async move {
                    let result = ctrl.loader.load(domain, layer).await;
                    ctrl.on_fetch_complete(layer, result).await;
                });
                ToggleOutcome::FetchStarted
            }
            Action::Pending => {
                debug!(layer, "fetch in flight, toggle ignored");
                ToggleOutcome::FetchPending
            }
            Action::Failed => {
                self.notifier
                    .error(&format!("Failed to load {} data", layer));
                ToggleOutcome::Failed
            }
            Action::Activate => {
                self.activate(layer).await;
                ToggleOutcome::Shown
            }
        }
    }

    /// Fetch resolution half of the state machine.
    ///
    /// On success the cache becomes `Loaded` and the pending user intent is
    /// honored with a synthetic re-activation; on failure the cache parks in
    /// `Failed` and the error is surfaced. A completion arriving for a layer
    /// no longer in `Loading` (e.g. invalidated meanwhile) is ignored.
    pub async fn on_fetch_complete(
        self: &Arc<Self>,
        layer: &str,
        result: Result<Vec<crate::layer::Feature>, LoadError>,
    ) {
        let Some(layer) = self.resolve(layer) else {
            return;
        };

        let loaded = {
            let mut registry = self.registry.lock().unwrap();
            let entry = registry.get_mut(layer).unwrap();
            if entry.cache != LayerCache::Loading {
                debug!(layer, "stale fetch completion ignored");
                return;
            }
            match result {
                Ok(features) => {
                    entry.cache = LayerCache::Loaded(features);
                    true
                }
                Err(err) => {
                    error!(layer, %err, "layer fetch failed");
                    entry.cache = LayerCache::Failed;
                    false
                }
            }
        };

        if loaded {
            self.activate(layer).await;
        } else {
            self.notifier
                .error(&format!("Failed to load {} data", layer));
        }
    }

    /// Shows a layer whose cache is `Loaded`, building markers on the first
    /// activation of the current cache generation.
    async fn activate(self: &Arc<Self>, layer: &'static str) {
        let (to_hide, build) = {
            let mut registry = self.registry.lock().unwrap();
            let exclusive = registry.domain().exclusive();

            // Exclusive domains show at most one layer at a time.
            let to_hide = if exclusive {
                let others: Vec<&'static str> = registry
                    .visible_layers()
                    .into_iter()
                    .filter(|name| *name != layer)
                    .collect();
                for name in &others {
                    registry.get_mut(name).unwrap().visible = false;
                }
                others
            } else {
                Vec::new()
            };

            let entry = registry.get_mut(layer).unwrap();
            entry.visible = true;
            let build = if entry.markers_built {
                None
            } else {
                entry.markers_built = true;
                match &entry.cache {
                    LayerCache::Loaded(features) => Some(features.clone()),
                    // activate is only reached with a Loaded cache
                    _ => None,
                }
            };
            (to_hide, build)
        };

        for name in to_hide {
            self.markers.hide_layer(name);
        }

        match build {
            Some(features) => {
                info!(layer, count = features.len(), "building markers");
                add_markers_chunked(self.markers.as_ref(), layer, &features).await;
            }
            None => self.markers.show_layer(layer),
        }
    }

    /// Aggregate toggle used by the road-conditions "all layers" control.
    ///
    /// Flips every non-failed layer towards the aggregate target state:
    /// all on if any is off, otherwise all off.
    pub async fn toggle_all(self: &Arc<Self>) {
        let layers = self.registry.lock().unwrap().aggregate_toggle_set();
        for layer in layers {
            self.toggle(layer).await;
        }
    }

    /// Checked state of the aggregate control.
    pub fn all_checked(&self) -> bool {
        self.registry.lock().unwrap().all_checked()
    }

    /// Resets a layer to its initial state (manual refresh).
    pub fn invalidate(&self, layer: &str) {
        self.registry.lock().unwrap().invalidate(layer);
    }

    /// Snapshot of a layer's current state.
    pub fn inspect(&self, layer: &str) -> Option<LayerEntry> {
        self.registry.lock().unwrap().get(layer).cloned()
    }

    /// Names of currently visible layers.
    pub fn visible_layers(&self) -> Vec<&'static str> {
        self.registry.lock().unwrap().visible_layers()
    }

    fn resolve(&self, layer: &str) -> Option<&'static str> {
        let registry = self.registry.lock().unwrap();
        registry
            .domain()
            .layers()
            .iter()
            .find(|name| **name == layer)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLng;
    use crate::layer::feature::{Feature, FeatureAttrs};
    use crate::net::HttpError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Loader whose futures never resolve, so tests drive
    /// `on_fetch_complete` deterministically.
    struct PendingLoader {
        load_count: AtomicUsize,
    }

    impl PendingLoader {
        fn new() -> Self {
            Self {
                load_count: AtomicUsize::new(0),
            }
        }
    }

    impl LayerLoader for PendingLoader {
        async fn load(&self, _domain: Domain, _layer: &str) -> Result<Vec<Feature>, LoadError> {
            self.load_count.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        added: Mutex<Vec<String>>,
        shown: Mutex<Vec<String>>,
        hidden: Mutex<Vec<String>>,
    }

    impl MarkerSink for RecordingSink {
        fn add_marker(&self, layer: &str, _feature: &Feature) {
            self.added.lock().unwrap().push(layer.to_string());
        }
        fn show_layer(&self, layer: &str) {
            self.shown.lock().unwrap().push(layer.to_string());
        }
        fn hide_layer(&self, layer: &str) {
            self.hidden.lock().unwrap().push(layer.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        errors: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    type TestController = LayerController<PendingLoader, RecordingSink, RecordingNotifier>;

    fn controller(domain: Domain) -> (Arc<TestController>, Arc<RecordingSink>, Arc<RecordingNotifier>) {
        let loader = Arc::new(PendingLoader::new());
        let sink = Arc::new(RecordingSink::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let ctrl = Arc::new(LayerController::new(
            domain,
            loader,
            Arc::clone(&sink),
            Arc::clone(&notifier),
        ));
        (ctrl, sink, notifier)
    }

    fn feature(lat: f64) -> Feature {
        Feature {
            position: LatLng::new(lat, -120.0).unwrap(),
            attrs: FeatureAttrs::Road {
                kind: "Incident".into(),
                description: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn first_toggle_starts_fetch_and_returns_immediately() {
        let (ctrl, _, _) = controller(Domain::RoadConditions);
        let outcome = ctrl.toggle("Incident").await;
        assert_eq!(outcome, ToggleOutcome::FetchStarted);

        let entry = ctrl.inspect("Incident").unwrap();
        assert_eq!(entry.cache, LayerCache::Loading);
        assert!(!entry.visible);
    }

    #[tokio::test]
    async fn second_toggle_while_loading_is_a_no_op() {
        let (ctrl, _, _) = controller(Domain::RoadConditions);
        ctrl.toggle("Incident").await;
        assert_eq!(ctrl.toggle("Incident").await, ToggleOutcome::FetchPending);
        assert_eq!(
            ctrl.inspect("Incident").unwrap().cache,
            LayerCache::Loading
        );
    }

    #[tokio::test]
    async fn fetch_success_honors_pending_show_intent() {
        let (ctrl, sink, _) = controller(Domain::RoadConditions);
        ctrl.toggle("Incident").await;

        ctrl.on_fetch_complete("Incident", Ok(vec![feature(40.0)]))
            .await;

        let entry = ctrl.inspect("Incident").unwrap();
        assert!(entry.visible);
        assert!(entry.markers_built);
        assert!(entry.cache.is_loaded());
        assert_eq!(sink.added.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_parks_layer_in_failed_state() {
        let (ctrl, _, notifier) = controller(Domain::RoadConditions);
        ctrl.toggle("Incident").await;
        ctrl.on_fetch_complete(
            "Incident",
            Err(LoadError::Network(HttpError::Network("timeout".into()))),
        )
        .await;

        let entry = ctrl.inspect("Incident").unwrap();
        assert_eq!(entry.cache, LayerCache::Failed);
        assert!(!entry.visible);
        assert_eq!(notifier.errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_layer_never_refetches() {
        let (ctrl, _, notifier) = controller(Domain::RoadConditions);
        ctrl.toggle("Incident").await;
        ctrl.on_fetch_complete(
            "Incident",
            Err(LoadError::Network(HttpError::Network("down".into()))),
        )
        .await;

        assert_eq!(ctrl.toggle("Incident").await, ToggleOutcome::Failed);
        assert_eq!(ctrl.toggle("Incident").await, ToggleOutcome::Failed);
        // One error from the failed fetch, one per retry toggle.
        assert_eq!(notifier.errors.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn markers_built_exactly_once_per_cache_generation() {
        let (ctrl, sink, _) = controller(Domain::RoadConditions);
        ctrl.toggle("Incident").await;
        ctrl.on_fetch_complete("Incident", Ok(vec![feature(40.0), feature(41.0)]))
            .await;
        assert_eq!(sink.added.lock().unwrap().len(), 2);

        // Hide, then show again: markers are re-shown, not rebuilt.
        assert_eq!(ctrl.toggle("Incident").await, ToggleOutcome::Hidden);
        assert_eq!(ctrl.toggle("Incident").await, ToggleOutcome::Shown);
        assert_eq!(sink.added.lock().unwrap().len(), 2);
        assert_eq!(sink.shown.lock().unwrap().as_slice(), ["Incident"]);
    }

    #[tokio::test]
    async fn toggle_pair_is_idempotent_once_loaded() {
        let (ctrl, _, _) = controller(Domain::RoadConditions);
        ctrl.toggle("Incident").await;
        ctrl.on_fetch_complete("Incident", Ok(vec![feature(40.0)]))
            .await;

        let before = ctrl.inspect("Incident").unwrap();
        ctrl.toggle("Incident").await;
        ctrl.toggle("Incident").await;
        let after = ctrl.inspect("Incident").unwrap();
        assert_eq!(before.visible, after.visible);
        assert_eq!(before.markers_built, after.markers_built);
    }

    #[tokio::test]
    async fn invalidate_forces_fresh_fetch_and_build() {
        let (ctrl, sink, _) = controller(Domain::RoadConditions);
        ctrl.toggle("Incident").await;
        ctrl.on_fetch_complete("Incident", Ok(vec![feature(40.0)]))
            .await;
        assert_eq!(sink.added.lock().unwrap().len(), 1);

        ctrl.invalidate("Incident");
        assert_eq!(ctrl.toggle("Incident").await, ToggleOutcome::FetchStarted);
        ctrl.on_fetch_complete("Incident", Ok(vec![feature(42.0)]))
            .await;
        assert_eq!(sink.added.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn stale_completion_after_invalidate_is_ignored() {
        let (ctrl, _, _) = controller(Domain::RoadConditions);
        ctrl.toggle("Incident").await;
        ctrl.invalidate("Incident");

        ctrl.on_fetch_complete("Incident", Ok(vec![feature(40.0)]))
            .await;
        assert_eq!(
            ctrl.inspect("Incident").unwrap().cache,
            LayerCache::Unloaded
        );
    }

    #[tokio::test]
    async fn exclusive_domain_hides_previous_layer() {
        let (ctrl, sink, _) = controller(Domain::WeatherCurrent);
        ctrl.toggle("Wind").await;
        ctrl.on_fetch_complete("Wind", Ok(vec![feature(40.0)])).await;
        assert_eq!(ctrl.visible_layers(), vec!["Wind"]);

        ctrl.toggle("Humidity").await;
        ctrl.on_fetch_complete("Humidity", Ok(vec![feature(41.0)]))
            .await;
        assert_eq!(ctrl.visible_layers(), vec!["Humidity"]);
        assert!(sink.hidden.lock().unwrap().contains(&"Wind".to_string()));
    }

    #[tokio::test]
    async fn unknown_layer_is_rejected() {
        let (ctrl, _, _) = controller(Domain::Fire);
        assert_eq!(ctrl.toggle("Incident").await, ToggleOutcome::UnknownLayer);
    }

    #[tokio::test]
    async fn aggregate_state_excludes_failed_layers() {
        let (ctrl, _, _) = controller(Domain::Fire);
        ctrl.toggle("FireIncidents").await;
        ctrl.on_fetch_complete("FireIncidents", Ok(vec![feature(40.0)]))
            .await;
        ctrl.toggle("FireDetectors").await;
        ctrl.on_fetch_complete(
            "FireDetectors",
            Err(LoadError::Network(HttpError::Network("down".into()))),
        )
        .await;

        // The only non-failed layer is visible.
        assert!(ctrl.all_checked());
    }
}
