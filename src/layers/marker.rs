use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::base::{LayerProperties, LayerTrait, LayerType},
};
use serde::{Deserialize, Serialize};

/// Label bound to a marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub text: String,
    /// Shown at all times instead of only on hover
    pub permanent: bool,
}

pub struct Marker {
    properties: LayerProperties,
    position: LatLng,
    title: Option<String>,
    tooltip: Option<Tooltip>,
    popup_text: Option<String>,
}

impl Marker {
    pub fn new(id: String, position: LatLng) -> Self {
        let properties = LayerProperties::new(id, "Marker".to_string(), LayerType::Marker);
        Self {
            properties,
            position,
            title: None,
            tooltip: None,
            popup_text: None,
        }
    }

    /// Hover label
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.properties.name = title.clone();
        self.title = Some(title);
        self
    }

    pub fn with_tooltip(mut self, text: impl Into<String>, permanent: bool) -> Self {
        self.tooltip = Some(Tooltip {
            text: text.into(),
            permanent,
        });
        self
    }

    pub fn with_popup(mut self, text: impl Into<String>) -> Self {
        self.popup_text = Some(text.into());
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn set_position(&mut self, position: LatLng) {
        self.position = position;
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn popup(&self) -> Option<&str> {
        self.popup_text.as_deref()
    }
}

impl std::fmt::Debug for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marker")
            .field("id", &self.properties.id)
            .field("position", &self.position)
            .field("title", &self.title)
            .finish()
    }
}

impl LayerTrait for Marker {
    crate::impl_layer_trait!(Marker, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "position": {
                "lat": self.position.lat,
                "lng": self.position.lng
            },
            "title": self.title,
            "tooltip": self.tooltip,
            "popup": self.popup_text
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(LatLngBounds::new(self.position, self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_builder() {
        let marker = Marker::new("station-0".into(), LatLng::new(-5.0, 3.0))
            .with_title("Iron Mine")
            .with_tooltip("Iron Mine", true);

        assert_eq!(marker.title(), Some("Iron Mine"));
        assert_eq!(marker.name(), "Iron Mine");
        assert!(marker.tooltip().is_some_and(|t| t.permanent));
        assert_eq!(marker.popup(), None);
        assert_eq!(marker.layer_type(), LayerType::Marker);
    }

    #[test]
    fn test_marker_options_json() {
        let marker = Marker::new("start".into(), LatLng::new(0.0, 0.0)).with_popup("Starting point");
        let options = marker.options();
        assert_eq!(options["popup"], "Starting point");
        assert!(options["title"].is_null());
    }
}
