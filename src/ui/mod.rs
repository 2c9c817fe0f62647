pub mod elements;
pub mod layers_control;
pub mod zoom_control;

pub use elements::{Button, ClassList, Position};
pub use layers_control::{LayersControl, OverlayEntry};
pub use zoom_control::ZoomControl;
