//! Core constants derived from Leaflet defaults and the mapshot output layout.
//! Keeping them in a single place makes it easier to tweak viewer-wide magic numbers.

/// Name of the manifest file written next to the tile pyramid.
pub const MANIFEST_FILE: &str = "mapshot.json";

/// Tile URL template relative to the manifest path.
pub const TILE_URL_TEMPLATE: &str = "zoom_{z}/tile_{x}_{y}.jpg";

/// How many interpolated zoom levels are allowed outside the native range.
pub const ZOOM_PADDING: i32 = 4;

/// Snap zoom levels to these quanta (0.1 → fractional zooms).
pub const DEFAULT_ZOOM_SNAP: f64 = 0.1;

/// Programmatic +/- zoom step when calling `zoom_in/zoom_out`.
pub const DEFAULT_ZOOM_DELTA: f64 = 1.0;

/// Zoom step used by the slider buttons while shift is held.
pub const SHIFT_ZOOM_DELTA: f64 = 2.0;

/// Pixels trimmed from each axis of a drawn zoom box (Leaflet's BoxZoom).
pub const BOX_ZOOM_SHRINK: f64 = 4.0;

/// Height of one zoom step on the slider, in pixels.
pub const SLIDER_STEP_HEIGHT: f64 = 8.0;

/// Height of the slider knob including its border, in pixels.
pub const SLIDER_KNOB_HEIGHT: f64 = 6.0;

/// Query parameters owned by the viewer.
pub const PARAM_PATH: &str = "path";
pub const PARAM_X: &str = "x";
pub const PARAM_Y: &str = "y";
pub const PARAM_Z: &str = "z";

/// Overlay keys used for URL serialization.
pub const OVERLAY_STATIONS: &str = "lt";
pub const OVERLAY_TAGS: &str = "lg";
pub const OVERLAY_DEBUG: &str = "ld";

/// CSS class toggled on the box-zoom button and the map container while active.
pub const BOX_ZOOM_ACTIVE_CLASS: &str = "leaflet-control-boxzoom-active";
