use crate::{
    core::geo::Point,
    input::events::{InputEvent, MapEvent, MouseButton},
    prelude::HashMap,
};
use std::collections::VecDeque;

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Event management system for the map
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event type
    listeners: HashMap<String, Vec<EventCallback>>,
    /// Event queue for processing
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Drop every listener registered for `event_type`
    pub fn off(&mut self, event_type: &str) {
        self.listeners.remove(event_type);
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: MapEvent) {
        log::trace!("queue {}", event.event_type());
        self.event_queue.push_back(event);
    }

    /// Takes everything queued so far, in emission order
    pub fn drain(&mut self) -> Vec<MapEvent> {
        self.event_queue.drain(..).collect()
    }

    /// Calls the listeners registered for this event's type
    pub fn notify(&self, event: &MapEvent) {
        if let Some(callbacks) = self.listeners.get(event.event_type()) {
            for callback in callbacks {
                callback(event);
            }
        }
    }

    /// Clear all events from the queue
    pub fn clear_events(&mut self) {
        self.event_queue.clear();
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}

/// Pointer-drag panning, the map's default handling of pointer input
#[derive(Debug, Default)]
pub struct DragHandler {
    enabled: bool,
    last_position: Option<Point>,
    moved: bool,
}

/// What the map should do with a pointer event after the drag handler saw it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragAction {
    /// Shift the view by this many pixels
    Pan(Point),
    /// The drag ended after moving the map
    Finished,
    Ignored,
}

impl DragHandler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disabling cancels a drag in progress
    pub fn disable(&mut self) {
        self.enabled = false;
        self.last_position = None;
        self.moved = false;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_dragging(&self) -> bool {
        self.last_position.is_some()
    }

    pub fn handle(&mut self, event: &InputEvent) -> DragAction {
        if !self.enabled {
            return DragAction::Ignored;
        }
        match event {
            InputEvent::MouseDown {
                position,
                button: MouseButton::Left,
                ..
            } => {
                self.last_position = Some(*position);
                self.moved = false;
                DragAction::Ignored
            }
            InputEvent::MouseMove { position } => match self.last_position {
                Some(last) => {
                    self.last_position = Some(*position);
                    let delta = last.subtract(position);
                    if delta.x == 0.0 && delta.y == 0.0 {
                        return DragAction::Ignored;
                    }
                    self.moved = true;
                    DragAction::Pan(delta)
                }
                None => DragAction::Ignored,
            },
            InputEvent::MouseUp { .. } => {
                let was_moved = self.last_position.take().is_some() && self.moved;
                self.moved = false;
                if was_moved {
                    DragAction::Finished
                } else {
                    DragAction::Ignored
                }
            }
            _ => DragAction::Ignored,
        }
    }
}
