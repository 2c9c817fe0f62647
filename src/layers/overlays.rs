//! Layers built from a world manifest: the base tile layer plus the
//! stations, tags and debug overlays.

use crate::{
    constants::{OVERLAY_DEBUG, OVERLAY_STATIONS, OVERLAY_TAGS},
    core::{
        geo::LatLng,
        mapper::{CoordinateMapper, WorldPoint},
    },
    data::manifest::WorldManifest,
    layers::{
        group::LayerGroup,
        marker::Marker,
        tile::{TileLayer, TileLayerOptions},
    },
    tiles::source::MapshotTileSource,
};

/// Layer id of the base tile layer
pub const BASE_LAYER_ID: &str = "base";

/// A toggleable marker layer and the key it is stored under in the URL
#[derive(Debug)]
pub struct Overlay {
    pub key: String,
    pub name: String,
    pub group: LayerGroup,
}

impl Overlay {
    fn new(key: &str, name: &str, markers: Vec<Marker>, visible: bool) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            group: LayerGroup::new(key, name)
                .with_markers(markers)
                .with_visible(visible),
        }
    }
}

/// Number formatting used in marker labels; negative zero prints as `0`
fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

pub struct OverlayBuilder<'a> {
    manifest: &'a WorldManifest,
    mapper: CoordinateMapper,
    path: String,
    zoom_padding: i32,
    visible: Vec<String>,
}

impl<'a> OverlayBuilder<'a> {
    pub fn new(manifest: &'a WorldManifest, path: impl Into<String>) -> Self {
        Self {
            manifest,
            mapper: CoordinateMapper::new(manifest.render_size, manifest.tile_size),
            path: path.into(),
            zoom_padding: crate::constants::ZOOM_PADDING,
            visible: Vec::new(),
        }
    }

    /// Interpolated zoom levels allowed outside the native range
    pub fn with_zoom_padding(mut self, padding: i32) -> Self {
        self.zoom_padding = padding;
        self
    }

    /// Overlay keys that start on the map
    pub fn with_visible(mut self, keys: &[String]) -> Self {
        self.visible = keys.to_vec();
        self
    }

    pub fn mapper(&self) -> CoordinateMapper {
        self.mapper
    }

    fn starts_visible(&self, key: &str) -> bool {
        self.visible.iter().any(|k| k == key)
    }

    /// The tile pyramid, bounded to the rendered world
    pub fn base_layer(&self) -> TileLayer {
        let m = self.manifest;
        let options = TileLayerOptions {
            tile_size: m.render_size,
            min_zoom: m.zoom_min.saturating_sub(self.zoom_padding) as f64,
            max_zoom: m.zoom_max.saturating_add(self.zoom_padding) as f64,
            min_native_zoom: Some(m.zoom_min),
            max_native_zoom: Some(m.zoom_max),
            bounds: Some(self.mapper.bounds_to_lat_lng(&m.world_min, &m.world_max)),
            no_wrap: true,
            ..Default::default()
        };
        TileLayer::new(
            BASE_LAYER_ID.to_string(),
            "Base".to_string(),
            Box::new(MapshotTileSource::new(self.path.clone())),
            options,
        )
    }

    /// One marker per station, at the middle of its bounding box
    pub fn stations(&self) -> Overlay {
        let markers = self
            .manifest
            .stations
            .iter()
            .enumerate()
            .map(|(i, station)| {
                let bbox = &station.bounding_box;
                Marker::new(
                    format!("{}-{}", OVERLAY_STATIONS, i),
                    self.mapper.midpoint(&bbox.left_top, &bbox.right_bottom),
                )
                .with_title(station.backer_name.clone())
                .with_tooltip(station.backer_name.clone(), true)
            })
            .collect();
        Overlay::new(
            OVERLAY_STATIONS,
            "Train stations",
            markers,
            self.starts_visible(OVERLAY_STATIONS),
        )
    }

    pub fn tags(&self) -> Overlay {
        let markers = self
            .manifest
            .tags
            .iter()
            .enumerate()
            .map(|(i, tag)| {
                let label = format!("{}: {}", tag.force_name, tag.text);
                Marker::new(
                    format!("{}-{}", OVERLAY_TAGS, i),
                    self.mapper.point_to_lat_lng(&tag.position),
                )
                .with_title(label.clone())
                .with_tooltip(label, true)
            })
            .collect();
        Overlay::new(OVERLAY_TAGS, "Tags", markers, self.starts_visible(OVERLAY_TAGS))
    }

    /// Origin, player and the four world corners
    pub fn debug(&self) -> Overlay {
        let m = self.manifest;
        let mut markers = vec![Marker::new(
            format!("{}-start", OVERLAY_DEBUG),
            LatLng::new(0.0, 0.0),
        )
        .with_title("Start")
        .with_popup("Starting point")];

        if let Some(player) = &m.player {
            markers.push(
                Marker::new(
                    format!("{}-player", OVERLAY_DEBUG),
                    self.mapper.point_to_lat_lng(player),
                )
                .with_title("Player")
                .with_popup("Player"),
            );
        }

        let corners = [
            WorldPoint::new(m.world_min.x, m.world_min.y),
            WorldPoint::new(m.world_min.x, m.world_max.y),
            WorldPoint::new(m.world_max.x, m.world_min.y),
            WorldPoint::new(m.world_max.x, m.world_max.y),
        ];
        for (i, corner) in corners.iter().enumerate() {
            markers.push(
                Marker::new(
                    format!("{}-corner-{}", OVERLAY_DEBUG, i),
                    self.mapper.point_to_lat_lng(corner),
                )
                .with_title(format!(
                    "{}, {}",
                    format_number(corner.x),
                    format_number(corner.y)
                )),
            );
        }

        Overlay::new(OVERLAY_DEBUG, "Debug", markers, self.starts_visible(OVERLAY_DEBUG))
    }

    /// All three overlays in registration order
    pub fn overlays(&self) -> Vec<Overlay> {
        vec![self.stations(), self.tags(), self.debug()]
    }
}
