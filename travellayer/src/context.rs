//! The application context.
//!
//! One explicitly constructed object owning the per-domain controllers, the
//! persistence facades, and the marker highlight cursor. Built once at
//! startup and passed by reference to whatever needs it; nothing in this
//! crate reaches for ambient global state.

use crate::coord::LatLng;
use crate::layer::{Domain, LayerController, RemoteLayerLoader, ToggleOutcome};
use crate::marker::{MarkerSink, NoOpMarkerSink};
use crate::module::ModuleRegistry;
use crate::net::{HttpError, ReqwestClient};
use crate::notify::{LogNotifier, Notifier};
use crate::secret::{AcquireError, AcquisitionFlow, CredentialPrompt, CredentialStore, CredentialVerifier};
use crate::settings::SettingsRegistry;
use crate::storage::{self, KvStore, MapViewState, MemoryStore, PayloadCache, StateStore};
use crate::time::{Clock, SystemClock};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Controller type used by the context: remote loading over reqwest.
pub type AppController<S, N> = LayerController<RemoteLayerLoader<ReqwestClient>, S, N>;

const ALL_DOMAINS: [Domain; 5] = [
    Domain::RoadConditions,
    Domain::WeatherCurrent,
    Domain::WeatherForecast,
    Domain::Fire,
    Domain::OtherInfo,
];

/// Builder for [`AppContext`].
pub struct ContextBuilder<S = NoOpMarkerSink, N = LogNotifier> {
    base_url: String,
    storage: Option<Arc<dyn KvStore>>,
    clock: Arc<dyn Clock>,
    markers: Arc<S>,
    notifier: Arc<N>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            base_url: String::new(),
            storage: None,
            clock: Arc::new(SystemClock),
            markers: Arc::new(NoOpMarkerSink),
            notifier: Arc::new(LogNotifier),
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, N> ContextBuilder<S, N> {
    /// Base URL of the remote data provider.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Persistent store backing credentials, settings, and view state.
    pub fn with_storage(mut self, storage: Arc<dyn KvStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Marker sink collaborator (the map widget adapter).
    pub fn with_markers<S2: MarkerSink>(self, markers: Arc<S2>) -> ContextBuilder<S2, N> {
        ContextBuilder {
            base_url: self.base_url,
            storage: self.storage,
            clock: self.clock,
            markers,
            notifier: self.notifier,
        }
    }

    /// Notification collaborator (the UI's error toast adapter).
    pub fn with_notifier<N2: Notifier>(self, notifier: Arc<N2>) -> ContextBuilder<S, N2> {
        ContextBuilder {
            base_url: self.base_url,
            storage: self.storage,
            clock: self.clock,
            markers: self.markers,
            notifier,
        }
    }
}

impl<S, N> ContextBuilder<S, N>
where
    S: MarkerSink + 'static,
    N: Notifier + 'static,
{
    /// Builds the context, probing storage availability.
    ///
    /// A store that fails the probe is replaced with an in-memory session
    /// store; the rest of the system runs unaware.
    pub fn build(self) -> Result<AppContext<S, N>, HttpError> {
        let storage: Arc<dyn KvStore> = match self.storage {
            Some(store) if storage::probe(store.as_ref()) => store,
            Some(_) => {
                info!("persistent storage unavailable, running in-memory");
                Arc::new(MemoryStore::new())
            }
            None => Arc::new(MemoryStore::new()),
        };

        let client = ReqwestClient::new()?;
        let mut controllers = HashMap::new();
        for domain in ALL_DOMAINS {
            let loader = Arc::new(RemoteLayerLoader::new(client.clone(), self.base_url.clone()));
            controllers.insert(
                domain,
                Arc::new(LayerController::new(
                    domain,
                    loader,
                    Arc::clone(&self.markers),
                    Arc::clone(&self.notifier),
                )),
            );
        }

        Ok(AppContext {
            settings: Arc::new(SettingsRegistry::new(Arc::clone(&storage))),
            modules: ModuleRegistry::new(),
            state: StateStore::new(Arc::clone(&storage), Arc::clone(&self.clock)),
            payloads: PayloadCache::new(Arc::clone(&storage), Arc::clone(&self.clock)),
            credentials: CredentialStore::new(Arc::clone(&storage)),
            clock: self.clock,
            storage,
            controllers,
            highlight: Mutex::new(None),
        })
    }
}

/// Everything the dashboard session owns, wired once at startup.
pub struct AppContext<S: MarkerSink + 'static, N: Notifier + 'static> {
    storage: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    settings: Arc<SettingsRegistry>,
    modules: ModuleRegistry,
    state: StateStore,
    payloads: PayloadCache,
    credentials: CredentialStore,
    controllers: HashMap<Domain, Arc<AppController<S, N>>>,
    /// Index of the currently highlighted marker, if any.
    highlight: Mutex<Option<usize>>,
}

impl<S: MarkerSink + 'static, N: Notifier + 'static> AppContext<S, N> {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// The controller owning one domain's layer registry.
    pub fn controller(&self, domain: Domain) -> &Arc<AppController<S, N>> {
        &self.controllers[&domain]
    }

    /// Toggles a layer on its domain's controller.
    pub async fn toggle(&self, domain: Domain, layer: &str) -> ToggleOutcome {
        self.controllers[&domain].toggle(layer).await
    }

    pub fn settings(&self) -> &Arc<SettingsRegistry> {
        &self.settings
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub fn payload_cache(&self) -> &PayloadCache {
        &self.payloads
    }

    pub fn credential_store(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn storage(&self) -> &Arc<dyn KvStore> {
        &self.storage
    }

    /// Applies a settings update and notifies the owning module's hook.
    pub fn update_module_settings(&self, module_id: &str, update: Value) {
        let merged = self.settings.update_module_settings(module_id, update);
        self.modules.notify_settings_updated(module_id, &merged);
    }

    /// Records the settled viewport: persists view state and fans the event
    /// out to modules with the map-move-end capability.
    pub fn on_map_move_end(&self, center: LatLng, zoom: u8) {
        let active_layers: HashMap<String, bool> = self
            .controllers
            .iter()
            .flat_map(|(_, ctrl)| {
                ctrl.visible_layers()
                    .into_iter()
                    .map(|layer| (layer.to_string(), true))
            })
            .collect();

        self.state.save_map_state(center, zoom, active_layers.clone());
        let state = MapViewState {
            center,
            zoom,
            active_layers,
            timestamp: self.clock.now_ms(),
        };
        self.modules.notify_map_move_end(&state);
    }

    /// Restores the persisted viewport, if fresh.
    pub fn restore_map_state(&self) -> Option<MapViewState> {
        self.state.load_map_state()
    }

    pub fn save_preferences(&self, preferences: &Value) {
        self.state.save_preferences(preferences);
    }

    pub fn load_preferences(&self) -> Option<Value> {
        self.state.load_preferences()
    }

    /// Yields the stored credential, or runs the acquisition flow.
    pub async fn ensure_credential<P, V>(
        &self,
        prompt: P,
        verifier: V,
    ) -> Result<String, AcquireError>
    where
        P: CredentialPrompt,
        V: CredentialVerifier,
    {
        if let Some(secret) = self.credentials.load().await {
            return Ok(secret);
        }
        AcquisitionFlow::new(prompt, verifier, &self.credentials)
            .run()
            .await
    }

    /// Highlights the marker at `index`, returning the previously
    /// highlighted index so the widget can restore its icon.
    pub fn set_highlight(&self, index: Option<usize>) -> Option<usize> {
        std::mem::replace(&mut *self.highlight.lock().unwrap(), index)
    }

    pub fn highlighted(&self) -> Option<usize> {
        *self.highlight.lock().unwrap()
    }
}
