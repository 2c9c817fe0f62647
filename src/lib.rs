//! # mapshot-viewer
//!
//! A Rust-native model of the mapshot world viewer, built the Leaflet way.
//!
//! The crate loads a `mapshot.json` manifest describing a tiled render of a
//! game world, builds a pannable/zoomable map over its tile pyramid, overlays
//! station, tag and debug markers, and keeps the camera and overlay state in
//! sync with the page URL. The box-zoom and zoom-slider controls are plugins
//! attached to the map.

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod plugins;
pub mod prelude;
pub mod runtime;
pub mod state;
pub mod tiles;
pub mod traits;
pub mod ui;
pub mod viewer;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod web;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::Bounds,
    config::ViewerConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{Map, MapOptions},
    mapper::{CoordinateMapper, WorldPoint},
    viewport::Viewport,
};

pub use data::{
    loader::{ManifestLoader, ManifestSource},
    manifest::WorldManifest,
};

pub use layers::{
    base::LayerTrait, group::LayerGroup, marker::Marker, overlays::OverlayBuilder,
    tile::TileLayer,
};

pub use input::{events::InputEvent, events::MapEvent};

pub use plugins::{base::PluginTrait, box_zoom::BoxZoomControl, zoom_slider::ZoomSliderControl};

pub use state::{
    query::QueryParams,
    store::{MemoryStore, ParamStore},
    sync::ViewStateSync,
    view::ViewState,
};

pub use viewer::Viewer;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid view: {0}")]
    InvalidView(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Parameter store error: {0}")]
    Store(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` with an `info` default, overridable through `RUST_LOG`
#[cfg(all(feature = "debug", not(target_arch = "wasm32")))]
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("logger already installed");
    }
}
