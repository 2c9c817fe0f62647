pub mod events;
pub mod handler;

// Re-export the essential types
pub use events::{EventHandled, InputEvent, KeyModifiers, MapEvent, MouseButton};
pub use handler::{DragAction, DragHandler, EventManager};
