#[macro_use]
pub mod macros;

pub mod base;
pub mod group;
pub mod manager;
pub mod marker;
pub mod overlays;
pub mod tile;

pub use base::{LayerProperties, LayerTrait, LayerType};
pub use group::LayerGroup;
pub use manager::LayerManager;
pub use marker::{Marker, Tooltip};
pub use overlays::{Overlay, OverlayBuilder, BASE_LAYER_ID};
pub use tile::{TileLayer, TileLayerOptions};
