use crate::{layers::base::LayerTrait, prelude::HashMap, Error, Result};

/// Owns every layer known to the map, kept in z-index order.
///
/// A layer's visibility flag says whether it is currently on the map.
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ordered list of layer IDs (sorted by z-index)
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer to the manager
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            return Err(Error::Layer(format!("duplicate layer id '{}'", layer_id)));
        }
        let z_index = layer.z_index();

        self.layers.insert(layer_id.clone(), layer);

        // Insert in sorted order by z-index
        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    /// Removes a layer from the manager
    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        self.render_order.retain(|id| id != layer_id);
        self.layers.remove(layer_id)
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Gets a layer downcast to its concrete type
    pub fn get_as<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.get_layer(layer_id)
            .and_then(|layer| layer.as_any().downcast_ref::<T>())
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(layer_id).map(|layer| f(layer.as_mut()))
    }

    /// Lists all layer IDs in z order
    pub fn list_layers(&self) -> Vec<String> {
        self.render_order.clone()
    }

    /// Gets all layers in z order
    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
            .collect()
    }

    /// Layers currently on the map, in z order
    pub fn visible_layers(&self) -> Vec<&dyn LayerTrait> {
        self.layers().into_iter().filter(|l| l.is_visible()).collect()
    }

    /// Min/max zoom over the on-map layers that declare one
    pub fn zoom_range(&self) -> (Option<f64>, Option<f64>) {
        let mut min_zoom: Option<f64> = None;
        let mut max_zoom: Option<f64> = None;
        for layer in self.visible_layers() {
            if let Some(min) = layer.min_zoom() {
                min_zoom = Some(min_zoom.map_or(min, |m| m.min(min)));
            }
            if let Some(max) = layer.max_zoom() {
                max_zoom = Some(max_zoom.map_or(max, |m| m.max(max)));
            }
        }
        (min_zoom, max_zoom)
    }

    /// Updates the order based on current z-indices
    pub fn update_render_order(&mut self) {
        self.render_order.sort_by(|a, b| {
            let z_a = self.layers.get(a).map(|l| l.z_index()).unwrap_or(0);
            let z_b = self.layers.get(b).map(|l| l.z_index()).unwrap_or(0);
            z_a.cmp(&z_b)
        });
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{
        group::LayerGroup,
        tile::{TileLayer, TileLayerOptions},
    };
    use crate::tiles::source::MapshotTileSource;

    fn tile_layer(id: &str, min: f64, max: f64) -> TileLayer {
        TileLayer::new(
            id.into(),
            id.into(),
            Box::new(MapshotTileSource::new("")),
            TileLayerOptions {
                min_zoom: min,
                max_zoom: max,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_z_order_and_duplicates() {
        let mut manager = LayerManager::new();
        let mut top = LayerGroup::new("top", "Top");
        top.set_z_index(10);
        manager.add_layer(Box::new(top)).unwrap();
        manager.add_layer(Box::new(LayerGroup::new("bottom", "Bottom"))).unwrap();

        assert_eq!(manager.list_layers(), vec!["bottom", "top"]);
        assert!(manager.add_layer(Box::new(LayerGroup::new("top", "Again"))).is_err());
        assert!(manager.get_as::<LayerGroup>("top").is_some());
        assert!(manager.get_as::<TileLayer>("top").is_none());
    }

    #[test]
    fn test_zoom_range_ignores_hidden_layers() {
        let mut manager = LayerManager::new();
        manager.add_layer(Box::new(tile_layer("a", -4.0, 9.0))).unwrap();
        let mut hidden = tile_layer("b", -10.0, 20.0);
        hidden.set_visible(false);
        manager.add_layer(Box::new(hidden)).unwrap();
        manager.add_layer(Box::new(LayerGroup::new("markers", "Markers"))).unwrap();

        assert_eq!(manager.zoom_range(), (Some(-4.0), Some(9.0)));
        manager.remove_layer("a");
        assert_eq!(manager.zoom_range(), (None, None));
    }
}
