//! TravelLayer - Road conditions and travel data overlay engine
//!
//! This library provides the core functionality behind the TravelLayer map
//! dashboard: per-domain overlay layer registries with a cache-and-toggle
//! protocol, remote GeoJSON layer loading, an encrypted credential store for
//! the map provider API key, and client-side persistence with expiry.
//!
//! Rendering, map SDK integration, and UI chrome are external collaborators
//! reached through trait seams ([`marker::MarkerSink`], [`notify::Notifier`],
//! [`secret::CredentialPrompt`]).
//!
//! # High-Level API
//!
//! ```ignore
//! use travellayer::context::AppContext;
//! use travellayer::layer::Domain;
//!
//! let ctx = AppContext::builder()
//!     .with_base_url("https://data.example.org")
//!     .build()?;
//!
//! // Toggle the Incident layer on the road-conditions registry
//! ctx.controller(Domain::RoadConditions).toggle("Incident").await;
//! ```

pub mod context;
pub mod coord;
pub mod layer;
pub mod logging;
pub mod marker;
pub mod module;
pub mod net;
pub mod notify;
pub mod secret;
pub mod settings;
pub mod storage;
pub mod time;

/// Version of the TravelLayer library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
