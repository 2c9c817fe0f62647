//! Registry of toggleable overlays, the model behind Leaflet's layers control.

use crate::ui::elements::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEntry {
    pub layer_id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct LayersControl {
    position: Position,
    overlays: Vec<OverlayEntry>,
}

impl LayersControl {
    pub fn new() -> Self {
        Self {
            position: Position::TopRight,
            overlays: Vec::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Registering the same layer twice renames it
    pub fn add_overlay(&mut self, layer_id: &str, name: &str) {
        match self.overlays.iter_mut().find(|e| e.layer_id == layer_id) {
            Some(entry) => entry.name = name.to_string(),
            None => self.overlays.push(OverlayEntry {
                layer_id: layer_id.to_string(),
                name: name.to_string(),
            }),
        }
    }

    pub fn remove_overlay(&mut self, layer_id: &str) {
        self.overlays.retain(|e| e.layer_id != layer_id);
    }

    /// Display name of a registered overlay
    pub fn overlay_name(&self, layer_id: &str) -> Option<&str> {
        self.overlays
            .iter()
            .find(|e| e.layer_id == layer_id)
            .map(|e| e.name.as_str())
    }

    /// Entries in registration order
    pub fn overlays(&self) -> &[OverlayEntry] {
        &self.overlays
    }
}

impl Default for LayersControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut control = LayersControl::new();
        control.add_overlay("lt", "Train stations");
        control.add_overlay("lg", "Tags");
        control.add_overlay("lt", "Stations");

        assert_eq!(control.overlays().len(), 2);
        assert_eq!(control.overlay_name("lt"), Some("Stations"));
        control.remove_overlay("lt");
        assert_eq!(control.overlay_name("lt"), None);
        assert_eq!(control.position(), Position::TopRight);
    }
}
