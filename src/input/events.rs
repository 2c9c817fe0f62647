use crate::core::geo::{LatLng, LatLngBounds, Point};
use serde::{Deserialize, Serialize};

/// Input events that can be handled by the map and its controls.
///
/// Positions are container-relative pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pointer button pressed
    MouseDown {
        position: Point,
        button: MouseButton,
        modifiers: KeyModifiers,
    },
    /// Pointer moved
    MouseMove { position: Point },
    /// Pointer button released
    MouseUp { position: Point },
    /// Viewport/window resize
    Resize { size: Point },
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

/// Map event types that can be emitted by the map
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Zoom ended
    ZoomEnd { zoom: f64 },
    /// Pan ended
    MoveEnd { center: LatLng },
    /// Container size changed
    Resize { size: Point },
    /// The allowed zoom range changed
    ZoomLevelsChange { min_zoom: f64, max_zoom: f64 },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
    /// Overlay layer was added
    OverlayAdd { layer_id: String, name: String },
    /// Overlay layer was removed
    OverlayRemove { layer_id: String, name: String },
    /// A box-zoom drag started drawing
    BoxZoomStart,
    /// A box-zoom drag finished and the map fit the box
    BoxZoomEnd { bounds: LatLngBounds },
}

impl MapEvent {
    /// Leaflet-style event name, used for listener registration
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::ZoomEnd { .. } => "zoomend",
            MapEvent::MoveEnd { .. } => "moveend",
            MapEvent::Resize { .. } => "resize",
            MapEvent::ZoomLevelsChange { .. } => "zoomlevelschange",
            MapEvent::LayerAdd { .. } => "layeradd",
            MapEvent::LayerRemove { .. } => "layerremove",
            MapEvent::OverlayAdd { .. } => "overlayadd",
            MapEvent::OverlayRemove { .. } => "overlayremove",
            MapEvent::BoxZoomStart => "boxzoomstart",
            MapEvent::BoxZoomEnd { .. } => "boxzoomend",
        }
    }

    /// True for events after which the camera may sit somewhere new
    pub fn is_view_change(&self) -> bool {
        matches!(
            self,
            MapEvent::ZoomEnd { .. } | MapEvent::MoveEnd { .. } | MapEvent::Resize { .. }
        )
    }
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl InputEvent {
    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::MouseDown { position, .. } => Some(*position),
            InputEvent::MouseMove { position } => Some(*position),
            InputEvent::MouseUp { position } => Some(*position),
            InputEvent::Resize { .. } => None,
        }
    }

    /// Checks if this is a mouse/pointer event
    pub fn is_pointer_event(&self) -> bool {
        matches!(
            self,
            InputEvent::MouseDown { .. } | InputEvent::MouseMove { .. } | InputEvent::MouseUp { .. }
        )
    }

    /// Convenience constructor for a primary-button press
    pub fn primary_down(position: Point, modifiers: KeyModifiers) -> Self {
        InputEvent::MouseDown {
            position,
            button: MouseButton::Left,
            modifiers,
        }
    }
}
