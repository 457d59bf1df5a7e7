//! Remote layer data loading.
//!
//! Fetches a layer's JSON document from the data provider and normalizes it
//! into the registry's cache shape. The contract is uniform across domains:
//! an array of features, or an error the controller converts to the `Failed`
//! sentinel. Nothing escapes the loader boundary as a panic.

use crate::layer::feature::{normalize_payload, Feature};
use crate::layer::types::Domain;
use crate::net::{AsyncHttpClient, HttpError};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while loading a layer's data.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Fetch failed (transport error or non-2xx status).
    #[error("network failure: {0}")]
    Network(#[from] HttpError),

    /// Payload was not valid JSON.
    #[error("malformed payload for {layer}: {message}")]
    Decode { layer: String, message: String },

    /// Layer name the domain does not own.
    #[error("unknown layer '{layer}' for domain {domain}")]
    UnknownLayer { domain: Domain, layer: String },
}

/// Source of layer data, injectable for tests.
pub trait LayerLoader: Send + Sync {
    /// Fetches and normalizes one layer's dataset.
    fn load(
        &self,
        domain: Domain,
        layer: &str,
    ) -> impl Future<Output = Result<Vec<Feature>, LoadError>> + Send;
}

/// Loader backed by the remote data provider over HTTP.
pub struct RemoteLayerLoader<C: AsyncHttpClient> {
    client: C,
    base_url: String,
}

impl<C: AsyncHttpClient> RemoteLayerLoader<C> {
    /// Creates a loader rooted at the provider's base URL.
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    /// Absolute URL of a layer's document.
    fn layer_url(&self, domain: Domain, layer: &str) -> Option<String> {
        domain
            .layer_path(layer)
            .map(|path| format!("{}/{}", self.base_url, path))
    }
}

impl<C: AsyncHttpClient> LayerLoader for RemoteLayerLoader<C> {
    async fn load(&self, domain: Domain, layer: &str) -> Result<Vec<Feature>, LoadError> {
        let url = self
            .layer_url(domain, layer)
            .ok_or_else(|| LoadError::UnknownLayer {
                domain,
                layer: layer.to_string(),
            })?;

        debug!(%domain, layer, url, "loading layer data");
        let body = self.client.get(&url).await?;

        let payload: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| LoadError::Decode {
                layer: layer.to_string(),
                message: e.to_string(),
            })?;

        let features = normalize_payload(domain, layer, &payload);
        info!(%domain, layer, count = features.len(), "layer data loaded");
        Ok(features)
    }
}
