use crate::{
    core::geo::LatLngBounds,
    layers::{
        base::{LayerProperties, LayerTrait, LayerType},
        marker::Marker,
    },
};

/// A fixed collection of markers toggled on and off as one layer
#[derive(Debug)]
pub struct LayerGroup {
    properties: LayerProperties,
    markers: Vec<Marker>,
}

impl LayerGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            properties: LayerProperties::new(id.into(), name.into(), LayerType::Group),
            markers: Vec::new(),
        }
    }

    pub fn with_markers(mut self, markers: Vec<Marker>) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.properties.visible = visible;
        self
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl LayerTrait for LayerGroup {
    crate::impl_layer_trait!(LayerGroup, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "markers": self.markers.iter().map(|m| m.options()).collect::<Vec<_>>()
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        let mut iter = self.markers.iter();
        let first = iter.next()?.position();
        let mut bounds = LatLngBounds::new(first, first);
        for marker in iter {
            bounds.extend(&marker.position());
        }
        Some(bounds)
    }
}
