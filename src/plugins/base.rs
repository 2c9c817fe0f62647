use crate::{
    core::map::Map,
    input::events::{EventHandled, InputEvent, MapEvent},
    ui::elements::Position,
    Result,
};

/// A control or behavior attached to a [`Map`].
///
/// The map lends itself mutably to every hook, so plugins can toggle map
/// handlers, change the camera and emit events of their own.
pub trait PluginTrait: Send + Sync {
    fn name(&self) -> &str;

    /// Corner of the map container the control sits in
    fn position(&self) -> Position {
        Position::TopLeft
    }

    fn on_add(&mut self, _map: &mut Map) -> Result<()> {
        Ok(())
    }

    fn on_remove(&mut self, _map: &mut Map) -> Result<()> {
        Ok(())
    }

    /// Sees pointer input before the map's own handlers
    fn handle_input(&mut self, _input: &InputEvent, _map: &mut Map) -> Result<EventHandled> {
        Ok(EventHandled::NotHandled)
    }

    /// Called for every event the map drains from its queue
    fn on_map_event(&mut self, _event: &MapEvent, _map: &mut Map) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
