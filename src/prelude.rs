//! Prelude module for common mapshot-viewer types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapshot_viewer::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::ViewerConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{Map, MapOptions},
    mapper::{CoordinateMapper, WorldPoint},
    viewport::Viewport,
};

pub use crate::data::{
    loader::{FileSource, HttpSource, ManifestLoader, ManifestSource, MemorySource},
    manifest::WorldManifest,
};

pub use crate::layers::{
    base::LayerTrait,
    group::LayerGroup,
    manager::LayerManager,
    marker::Marker,
    overlays::{Overlay, OverlayBuilder},
    tile::{TileLayer, TileLayerOptions},
};

pub use crate::plugins::{
    base::PluginTrait,
    box_zoom::{AspectRatioPolicy, BoxBoundsPolicy, BoxZoomControl, BoxZoomOptions, DragRectPolicy},
    zoom_slider::{ZoomSliderControl, ZoomSliderOptions},
};

pub use crate::input::{
    events::{EventHandled, InputEvent, KeyModifiers, MapEvent, MouseButton},
    handler::EventManager,
};

pub use crate::state::{
    query::QueryParams,
    store::{MemoryStore, ParamStore},
    sync::ViewStateSync,
    view::ViewState,
};

pub use crate::tiles::source::{MapshotTileSource, TileSource};

pub use crate::viewer::Viewer;

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
