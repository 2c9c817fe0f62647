use crate::{
    core::map::Map,
    input::events::MapEvent,
    plugins::base::PluginTrait,
    ui::elements::{Button, Position},
    Result,
};

const DISABLED_CLASS: &str = "leaflet-disabled";

/// Plain +/- zoom buttons
pub struct ZoomControl {
    zoom_in: Button,
    zoom_out: Button,
}

impl ZoomControl {
    pub const NAME: &'static str = "zoom";

    pub fn new() -> Self {
        Self {
            zoom_in: Button::new("Zoom in", "leaflet-control-zoom-in"),
            zoom_out: Button::new("Zoom out", "leaflet-control-zoom-out"),
        }
    }

    pub fn zoom_in_button(&self) -> &Button {
        &self.zoom_in
    }

    pub fn zoom_out_button(&self) -> &Button {
        &self.zoom_out
    }

    /// Shift triples the step
    pub fn zoom_in(&self, shift: bool, map: &mut Map) -> Result<()> {
        if self.zoom_in.disabled {
            return Ok(());
        }
        let factor = if shift { 3.0 } else { 1.0 };
        map.zoom_in(Some(map.options().zoom_delta * factor))
    }

    pub fn zoom_out(&self, shift: bool, map: &mut Map) -> Result<()> {
        if self.zoom_out.disabled {
            return Ok(());
        }
        let factor = if shift { 3.0 } else { 1.0 };
        map.zoom_out(Some(map.options().zoom_delta * factor))
    }

    fn update_disabled(&mut self, map: &Map) {
        let zoom = map.get_zoom();
        self.zoom_in.disabled = zoom == map.max_zoom();
        self.zoom_out.disabled = zoom == map.min_zoom();
        self.zoom_in.classes.toggle(DISABLED_CLASS, self.zoom_in.disabled);
        self.zoom_out.classes.toggle(DISABLED_CLASS, self.zoom_out.disabled);
    }
}

impl Default for ZoomControl {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginTrait for ZoomControl {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn position(&self) -> Position {
        Position::TopLeft
    }

    fn on_add(&mut self, map: &mut Map) -> Result<()> {
        self.update_disabled(map);
        Ok(())
    }

    fn on_map_event(&mut self, event: &MapEvent, map: &mut Map) -> Result<()> {
        if matches!(
            event,
            MapEvent::ZoomEnd { .. } | MapEvent::ZoomLevelsChange { .. }
        ) {
            self.update_disabled(map);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
