//! One-shot layer fetch.
//!
//! Fetches a single layer's dataset from the data provider and prints a
//! summary, using the same loader the engine uses. Useful for checking
//! provider health and eyeballing what a layer carries.

use console::style;
use travellayer::layer::{Domain, FeatureAttrs, LayerLoader, RemoteLayerLoader};
use travellayer::net::ReqwestClient;

use crate::error::CliError;

/// Number of features echoed in the summary.
const PREVIEW_COUNT: usize = 10;

/// Fetch a layer and print its features, or list the domain's layers.
pub async fn run(domain: Domain, layer: Option<&str>, base_url: &str) -> Result<(), CliError> {
    let Some(layer) = layer else {
        println!("Layers in {}:", domain);
        for name in domain.layers() {
            println!("  {}", name);
        }
        return Ok(());
    };

    let client = ReqwestClient::new().map_err(|e| CliError::HttpClient(e.to_string()))?;
    let loader = RemoteLayerLoader::new(client, base_url);

    println!("Fetching {} / {}...", domain, layer);
    let features = loader.load(domain, layer).await?;

    println!(
        "{} {} features",
        style(features.len()).bold(),
        style(layer).bold()
    );
    for feature in features.iter().take(PREVIEW_COUNT) {
        let label = match &feature.attrs {
            FeatureAttrs::Road { kind, description } => format!("{}: {}", kind, description),
            FeatureAttrs::Weather { value, unit } => format!("{} {}", value, unit),
            FeatureAttrs::Fire {
                name,
                size,
                containment,
                ..
            } => format!("{} ({} acres, {} contained)", name, size, containment),
            FeatureAttrs::Info { kind, name, .. } => format!("{}: {}", kind, name),
        };
        println!(
            "  {:.4}, {:.4}  {}",
            feature.position.lat, feature.position.lng, label
        );
    }
    if features.len() > PREVIEW_COUNT {
        println!("  ... and {} more", features.len() - PREVIEW_COUNT);
    }

    Ok(())
}
