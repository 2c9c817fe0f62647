use crate::{
    core::{
        geo::{LatLngBounds, Point, TileCoord},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    tiles::source::TileSource,
};

/// Configuration for a tile layer
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TileLayerOptions {
    /// Tile size in pixels
    pub tile_size: f64,
    /// Lowest zoom at which the layer shows anything
    pub min_zoom: f64,
    /// Highest zoom at which the layer shows anything
    pub max_zoom: f64,
    /// Lowest zoom with real imagery; below it tiles are scaled down
    pub min_native_zoom: Option<i32>,
    /// Highest zoom with real imagery; above it tiles are scaled up
    pub max_native_zoom: Option<i32>,
    /// Tiles entirely outside these bounds are never requested
    pub bounds: Option<LatLngBounds>,
    pub no_wrap: bool,
    pub opacity: f32,
    pub z_index: i32,
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            tile_size: 256.0,
            min_zoom: 0.0,
            max_zoom: 18.0,
            min_native_zoom: None,
            max_native_zoom: None,
            bounds: None,
            no_wrap: false,
            opacity: 1.0,
            z_index: 1,
        }
    }
}

/// Tile layer over a [`TileSource`], computing which tiles a view needs
pub struct TileLayer {
    properties: LayerProperties,
    options: TileLayerOptions,
    source: Box<dyn TileSource>,
}

impl TileLayer {
    pub fn new(id: String, name: String, source: Box<dyn TileSource>, options: TileLayerOptions) -> Self {
        let mut properties = LayerProperties::new(id, name, LayerType::Tile);
        properties.opacity = options.opacity;
        properties.z_index = options.z_index;
        Self {
            properties,
            options,
            source,
        }
    }

    pub fn tile_options(&self) -> &TileLayerOptions {
        &self.options
    }

    pub fn tile_source(&self) -> &dyn TileSource {
        self.source.as_ref()
    }

    /// URL of the image for one tile
    pub fn tile_url(&self, coord: TileCoord) -> String {
        self.source.url(coord)
    }

    /// Zoom of the imagery used at map zoom `zoom`: rounded, then pulled into
    /// the native range. `None` when the layer is hidden at that zoom.
    pub fn native_zoom_for(&self, zoom: f64) -> Option<i32> {
        if !zoom.is_finite() || zoom < self.options.min_zoom || zoom > self.options.max_zoom {
            return None;
        }
        let mut tile_zoom = zoom.round() as i32;
        if let Some(max) = self.options.max_native_zoom {
            tile_zoom = tile_zoom.min(max);
        }
        if let Some(min) = self.options.min_native_zoom {
            tile_zoom = tile_zoom.max(min);
        }
        Some(tile_zoom)
    }

    /// Pixel bounds of the view, projected at the tile zoom
    /// This matches Leaflet's _getTiledPixelBounds method
    pub fn tiled_pixel_bounds(&self, viewport: &Viewport, tile_zoom: i32) -> (Point, Point) {
        let scale = Viewport::scale(viewport.zoom - tile_zoom as f64);
        let pixel_center = viewport.project(&viewport.center, Some(tile_zoom as f64));
        let half_size = viewport.size.divide(scale * 2.0);

        (
            pixel_center.subtract(&half_size),
            pixel_center.add(&half_size),
        )
    }

    /// Inclusive tile index range covering the pixel bounds
    /// This matches Leaflet's _pxBoundsToTileRange method
    pub fn pixel_bounds_to_tile_range(&self, bounds: &(Point, Point)) -> (Point, Point) {
        let tile_size = self.options.tile_size;
        let min = Point::new(
            (bounds.0.x / tile_size).floor(),
            (bounds.0.y / tile_size).floor(),
        );
        let max = Point::new(
            (bounds.1.x / tile_size).ceil() - 1.0,
            (bounds.1.y / tile_size).ceil() - 1.0,
        );
        (min, max)
    }

    /// Geographic area covered by one tile
    pub fn tile_bounds(&self, coord: &TileCoord) -> LatLngBounds {
        let helper = Viewport::default();
        let tile_size = self.options.tile_size;
        let zoom = Some(coord.z as f64);
        let nw = Point::new(coord.x as f64 * tile_size, coord.y as f64 * tile_size);
        let se = nw.add(&Point::new(tile_size, tile_size));
        LatLngBounds::from_corners(helper.unproject(&nw, zoom), helper.unproject(&se, zoom))
    }

    fn is_valid_tile(&self, coord: &TileCoord) -> bool {
        match &self.options.bounds {
            Some(bounds) => bounds.overlaps(&self.tile_bounds(coord)),
            None => true,
        }
    }

    /// Tiles needed to cover the viewport, row by row
    pub fn tiles_in_view(&self, viewport: &Viewport) -> Vec<TileCoord> {
        let Some(tile_zoom) = self.native_zoom_for(viewport.zoom) else {
            return Vec::new();
        };
        let pixel_bounds = self.tiled_pixel_bounds(viewport, tile_zoom);
        let range = self.pixel_bounds_to_tile_range(&pixel_bounds);

        let mut coords = Vec::new();
        for y in (range.0.y as i32)..=(range.1.y as i32) {
            for x in (range.0.x as i32)..=(range.1.x as i32) {
                let coord = TileCoord::new(x, y, tile_zoom);
                if self.is_valid_tile(&coord) {
                    coords.push(coord);
                }
            }
        }
        coords
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);

    fn min_zoom(&self) -> Option<f64> {
        Some(self.options.min_zoom)
    }

    fn max_zoom(&self) -> Option<f64> {
        Some(self.options.max_zoom)
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        self.options.bounds.clone()
    }

    fn options(&self) -> serde_json::Value {
        serde_json::to_value(&self.options).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::geo::LatLng, tiles::source::MapshotTileSource};

    fn layer(bounds: Option<LatLngBounds>) -> TileLayer {
        TileLayer::new(
            "base".into(),
            "Base".into(),
            Box::new(MapshotTileSource::new("out/")),
            TileLayerOptions {
                tile_size: 256.0,
                min_zoom: -4.0,
                max_zoom: 9.0,
                min_native_zoom: Some(0),
                max_native_zoom: Some(5),
                bounds,
                no_wrap: true,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_native_zoom_rounds_and_clamps() {
        let layer = layer(None);
        assert_eq!(layer.native_zoom_for(2.4), Some(2));
        assert_eq!(layer.native_zoom_for(2.5), Some(3));
        assert_eq!(layer.native_zoom_for(8.0), Some(5));
        assert_eq!(layer.native_zoom_for(-3.0), Some(0));
        assert_eq!(layer.native_zoom_for(9.5), None);
    }

    #[test]
    fn test_tiles_in_view_covers_container() {
        let layer = layer(None);
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(512.0, 512.0));
        let tiles = layer.tiles_in_view(&viewport);
        // 512px centered on the origin spans tiles -1..=0 on both axes
        assert_eq!(tiles.len(), 4);
        assert!(tiles.contains(&TileCoord::new(-1, -1, 0)));
        assert!(tiles.contains(&TileCoord::new(0, 0, 0)));
    }

    #[test]
    fn test_bounds_filter_tiles() {
        // only the south-east quadrant of the origin
        let bounds = LatLngBounds::from_coords(-256.0, 0.0, 0.0, 256.0);
        let layer = layer(Some(bounds));
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(512.0, 512.0));
        assert_eq!(layer.tiles_in_view(&viewport), vec![TileCoord::new(0, 0, 0)]);
        assert_eq!(layer.tile_url(TileCoord::new(0, 0, 0)), "out/zoom_0/tile_0_0.jpg");
    }

    #[test]
    fn test_zoom_range_exposed_to_map() {
        let layer = layer(None);
        assert_eq!(LayerTrait::min_zoom(&layer), Some(-4.0));
        assert_eq!(LayerTrait::max_zoom(&layer), Some(9.0));
    }
}
