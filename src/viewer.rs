//! Startup of a whole viewer: path resolution, manifest fetch, map and layer
//! construction, controls and the initial URL state.

use crate::{
    constants::PARAM_PATH,
    core::{
        config::ViewerConfig,
        geo::{LatLng, LatLngBounds, TileCoord},
        map::{Map, MapOptions},
        mapper::{CoordinateMapper, WorldPoint},
        viewport::Viewport,
    },
    data::{
        loader::{resolve_path, ManifestLoader, ManifestSource},
        manifest::WorldManifest,
    },
    input::events::{EventHandled, InputEvent, MapEvent},
    layers::{
        base::LayerTrait,
        group::LayerGroup,
        marker::Tooltip,
        overlays::{OverlayBuilder, BASE_LAYER_ID},
        tile::TileLayer,
    },
    plugins::{box_zoom::BoxZoomControl, zoom_slider::ZoomSliderControl},
    state::{store::ParamStore, sync::ViewStateSync, view::ViewState},
    Error, Result,
};
use serde::Serialize;
use std::sync::Arc;

/// One tile the page should draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileView {
    pub coord: TileCoord,
    pub url: String,
    pub bounds: LatLngBounds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub position: LatLng,
    pub title: Option<String>,
    pub tooltip: Option<Tooltip>,
    pub popup: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    pub key: String,
    pub name: String,
    pub visible: bool,
    pub markers: Vec<MarkerView>,
}

/// Zoom-slider state the page renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderView {
    pub body_height: f64,
    pub knob_top: f64,
    pub zoom_in_disabled: bool,
    pub zoom_out_disabled: bool,
}

/// Everything the page needs to render the current frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub center: WorldPoint,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub container_classes: String,
    pub tiles: Vec<TileView>,
    pub overlays: Vec<OverlayView>,
    pub box_zoom_active: bool,
    pub slider: Option<SliderView>,
}

pub struct Viewer<S: ParamStore> {
    map: Map,
    sync: ViewStateSync<S>,
    manifest: WorldManifest,
    mapper: CoordinateMapper,
    path: String,
}

impl<S: ParamStore> Viewer<S> {
    /// Resolves the manifest path from `store`, fetches the manifest through
    /// `source` and builds the viewer. Any failure aborts startup.
    pub async fn load(config: &ViewerConfig, source: Arc<dyn ManifestSource>, store: S) -> Result<Self> {
        let params = store.read()?;
        let path = resolve_path(params.get(PARAM_PATH), &config.default_path);
        log::info!("manifest path: {:?}", path);

        let manifest = ManifestLoader::new(source).load(&path).await?;
        Self::build(config, manifest, path, store)
    }

    /// Builds the viewer for an already loaded manifest
    pub fn build(config: &ViewerConfig, manifest: WorldManifest, path: String, store: S) -> Result<Self> {
        let options = MapOptions {
            zoom_snap: config.zoom_snap,
            zoom_delta: config.zoom_delta,
            zoom_control: false,
            zoom_slider_control: true,
            zoom_slider: config.zoom_slider.clone(),
            ..Default::default()
        };
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, config.container_size);
        let mut map = Map::with_options(viewport, options);

        let builder = OverlayBuilder::new(&manifest, path.clone())
            .with_zoom_padding(config.zoom_padding)
            .with_visible(&config.visible_overlays);
        let mapper = builder.mapper();
        map.add_layer(Box::new(builder.base_layer()))?;

        let mut sync = ViewStateSync::new(store, mapper);
        for overlay in builder.overlays() {
            sync.register_overlay(overlay.group.id(), &overlay.key);
            log::debug!("overlay {} with {} markers", overlay.key, overlay.group.len());
            map.add_overlay(Box::new(overlay.group), &overlay.name)?;
        }

        map.add_plugin(Box::new(BoxZoomControl::new(config.box_zoom.clone())))?;

        sync.apply_initial(&mut map)?;
        // controls catch up, the URL does not
        let startup = map.process_events();
        log::debug!("{} startup events not written back", startup.len());

        Ok(Self {
            map,
            sync,
            manifest,
            mapper,
            path,
        })
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    pub fn manifest(&self) -> &WorldManifest {
        &self.manifest
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Resolved manifest base path
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn store(&self) -> &S {
        self.sync.store()
    }

    /// Current camera in world coordinates
    pub fn view_state(&self) -> ViewState {
        ViewState::from_map(&self.map, &self.mapper)
    }

    /// Feeds pointer input to the map, then delivers what it caused
    pub fn handle_input(&mut self, input: &InputEvent) -> Result<EventHandled> {
        let handled = self.map.handle_input(input)?;
        self.pump_events();
        Ok(handled)
    }

    /// Delivers queued map events to the controls and the URL state
    pub fn pump_events(&mut self) -> Vec<MapEvent> {
        let events = self.map.process_events();
        for event in &events {
            self.sync.on_map_event(event, &self.map);
        }
        events
    }

    /// Moves the camera to world point `center`
    pub fn go_to(&mut self, center: WorldPoint, zoom: f64) -> Result<()> {
        self.map.set_view(self.mapper.point_to_lat_lng(&center), zoom)?;
        self.pump_events();
        Ok(())
    }

    /// Flips the overlay stored under `key`; returns whether it is now shown
    pub fn toggle_overlay(&mut self, key: &str) -> Result<bool> {
        let layer_id = self
            .sync
            .overlay_layer(key)
            .ok_or_else(|| Error::Layer(format!("unknown overlay key '{}'", key)))?
            .to_string();
        let shown = self.map.toggle_layer(&layer_id)?;
        self.pump_events();
        Ok(shown)
    }

    /// Clicks the box-zoom button
    pub fn toggle_box_zoom(&mut self) -> Result<()> {
        self.map
            .with_plugin_mut::<BoxZoomControl, _, _>(BoxZoomControl::NAME, |control, map| {
                control.toggle_state(map)
            })
            .ok_or_else(|| Error::Plugin("box zoom control missing".to_string()))?;
        self.pump_events();
        Ok(())
    }

    pub fn box_zoom(&self) -> Option<&BoxZoomControl> {
        self.map.plugin::<BoxZoomControl>(BoxZoomControl::NAME)
    }

    pub fn zoom_slider(&self) -> Option<&ZoomSliderControl> {
        self.map.plugin::<ZoomSliderControl>(ZoomSliderControl::NAME)
    }

    fn with_slider<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ZoomSliderControl, &mut Map) -> Result<()>,
    {
        self.map
            .with_plugin_mut::<ZoomSliderControl, _, _>(ZoomSliderControl::NAME, f)
            .ok_or_else(|| Error::Plugin("zoom slider missing".to_string()))??;
        self.pump_events();
        Ok(())
    }

    /// The slider's `+` button
    pub fn zoom_in(&mut self, shift: bool) -> Result<()> {
        self.with_slider(|slider, map| slider.zoom_in(shift, map))
    }

    /// The slider's `-` button
    pub fn zoom_out(&mut self, shift: bool) -> Result<()> {
        self.with_slider(|slider, map| slider.zoom_out(shift, map))
    }

    /// Click `y` pixels below the top of the slider track
    pub fn click_slider_track(&mut self, y: f64) -> Result<()> {
        self.with_slider(|slider, map| slider.click_track(y, map))
    }

    pub fn start_knob_drag(&mut self, pointer_y: f64) -> Result<()> {
        self.with_slider(|slider, _| {
            slider.start_knob_drag(pointer_y);
            Ok(())
        })
    }

    pub fn drag_knob(&mut self, pointer_y: f64) -> Result<()> {
        self.with_slider(|slider, _| {
            slider.drag_knob(pointer_y);
            Ok(())
        })
    }

    pub fn end_knob_drag(&mut self) -> Result<()> {
        self.with_slider(|slider, map| slider.end_knob_drag(map))
    }

    /// Camera, visible tiles, overlays and control state
    pub fn snapshot(&self) -> ViewSnapshot {
        let map = &self.map;
        let state = self.view_state();

        let tiles = map
            .get_layer(BASE_LAYER_ID)
            .and_then(|layer| layer.as_any().downcast_ref::<TileLayer>())
            .map(|layer| {
                layer
                    .tiles_in_view(map.viewport())
                    .into_iter()
                    .map(|coord| TileView {
                        coord,
                        url: layer.tile_url(coord),
                        bounds: layer.tile_bounds(&coord),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let overlays = map
            .layers_control()
            .overlays()
            .iter()
            .filter_map(|entry| {
                let key = self.sync.overlay_key(&entry.layer_id)?;
                let group = map
                    .get_layer(&entry.layer_id)?
                    .as_any()
                    .downcast_ref::<LayerGroup>()?;
                Some(OverlayView {
                    key: key.to_string(),
                    name: entry.name.clone(),
                    visible: map.has_layer(&entry.layer_id),
                    markers: group
                        .markers()
                        .iter()
                        .map(|marker| MarkerView {
                            position: marker.position(),
                            title: marker.title().map(str::to_string),
                            tooltip: marker.tooltip().cloned(),
                            popup: marker.popup().map(str::to_string),
                        })
                        .collect(),
                })
            })
            .collect();

        let slider = self.zoom_slider().map(|slider| SliderView {
            body_height: slider.body_height(),
            knob_top: slider.knob().position(),
            zoom_in_disabled: slider.zoom_in_button().disabled,
            zoom_out_disabled: slider.zoom_out_button().disabled,
        });

        ViewSnapshot {
            center: state.center,
            zoom: state.zoom,
            min_zoom: map.min_zoom(),
            max_zoom: map.max_zoom(),
            container_classes: map.container_classes().to_string(),
            tiles,
            overlays,
            box_zoom_active: self.box_zoom().map_or(false, |c| c.is_active()),
            slider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::geo::Point, data::loader::MemorySource, state::store::MemoryStore};

    const MANIFEST: &str = r#"{
        "render_size": 1024, "tile_size": 256, "zoom_min": 0, "zoom_max": 3,
        "world_min": {"x": -64, "y": -64}, "world_max": {"x": 64, "y": 64},
        "stations": [{"bounding_box": {"left_top": {"x": 0, "y": 0}, "right_bottom": {"x": 4, "y": 2}},
                      "backer_name": "Central"}],
        "tags": [{"position": {"x": 8, "y": 8}, "force_name": "player", "text": "home"}]
    }"#;

    async fn viewer(query: &str) -> Viewer<MemoryStore> {
        let source = Arc::new(MemorySource::new().with_body("out/mapshot.json", MANIFEST));
        let store = MemoryStore::from_query(query);
        Viewer::load(&ViewerConfig::default(), source, store).await.unwrap()
    }

    #[tokio::test]
    async fn test_startup_uses_query_path_and_state() {
        let viewer = viewer("?path=out&x=10&y=20&z=3&lg=1").await;
        assert_eq!(viewer.path(), "out/");
        assert_eq!(viewer.view_state().center, WorldPoint::new(10.0, 20.0));
        assert_eq!(viewer.map().get_zoom(), 3.0);
        assert!(viewer.map().has_layer("lg"));
        assert!(!viewer.map().has_layer("lt"));
        assert!(viewer.map().has_layer("base"));
        assert!(viewer.store().history().is_empty());

        let slider = viewer.zoom_slider().unwrap();
        // zoom range -4..=7
        assert_eq!(slider.body_height(), 12.0 * 8.0);
        assert_eq!(slider.knob().get_value(), 7.0);
    }

    #[tokio::test]
    async fn test_missing_manifest_aborts() {
        let source = Arc::new(MemorySource::new());
        let result = Viewer::load(&ViewerConfig::default(), source, MemoryStore::from_query("?path=out")).await;
        assert!(matches!(result, Err(Error::HttpStatus { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_interaction_writes_back() {
        let mut viewer = viewer("?path=out").await;
        viewer.go_to(WorldPoint::new(5.5, -3.25), 2.0).unwrap();
        assert!(viewer.store().query_string().contains("x=5.5&y=-3.3&z=2.0"));

        assert!(viewer.toggle_overlay("lt").unwrap());
        assert!(!viewer.toggle_overlay("lt").unwrap());
        assert!(viewer.store().query_string().contains("lt=0"));
        assert!(viewer.toggle_overlay("zz").is_err());
    }

    #[tokio::test]
    async fn test_slider_buttons_and_knob_write_back() {
        let mut viewer = viewer("?path=out").await;
        viewer.zoom_in(false).unwrap();
        assert!(viewer.store().query_string().ends_with("z=1.0"));
        viewer.zoom_in(true).unwrap();
        assert_eq!(viewer.map().get_zoom(), 3.0);
        viewer.zoom_out(false).unwrap();
        assert_eq!(viewer.map().get_zoom(), 2.0);

        // two steps down the track is two zoom levels out
        viewer.start_knob_drag(50.0).unwrap();
        viewer.drag_knob(66.0).unwrap();
        viewer.end_knob_drag().unwrap();
        assert!((viewer.map().get_zoom() - 0.0).abs() < 1e-9);
        assert!(viewer.store().query_string().ends_with("z=0.0"));
    }

    #[tokio::test]
    async fn test_resize_writes_camera() {
        let mut viewer = viewer("?path=out&x=8&y=4&z=1").await;
        let same = InputEvent::Resize {
            size: Point::new(800.4, 600.0),
        };
        viewer.handle_input(&same).unwrap();
        assert!(viewer.store().history().is_empty());

        let resize = InputEvent::Resize {
            size: Point::new(1024.0, 768.0),
        };
        viewer.handle_input(&resize).unwrap();
        // moveend then resize
        let history = viewer.store().history();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|q| q == "path=out&x=8.0&y=4.0&z=1.0"));
        assert_eq!(viewer.map().get_size(), Point::new(1024.0, 768.0));
    }

    #[tokio::test]
    async fn test_snapshot_lists_tiles_and_overlays() {
        let viewer = viewer("?path=out&lg=1").await;
        let snapshot = viewer.snapshot();
        assert_eq!(snapshot.center, WorldPoint::new(0.0, 0.0));
        assert_eq!((snapshot.min_zoom, snapshot.max_zoom), (-4.0, 7.0));
        assert!(!snapshot.tiles.is_empty());
        assert!(snapshot
            .tiles
            .iter()
            .all(|tile| tile.url.starts_with("out/zoom_0/tile_")));

        let keys: Vec<_> = snapshot.overlays.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["lt", "lg", "ld"]);
        let tags = &snapshot.overlays[1];
        assert!(tags.visible);
        assert_eq!(tags.markers[0].title.as_deref(), Some("player: home"));
        assert!(!snapshot.overlays[0].visible);
        assert!(!snapshot.box_zoom_active);
        assert_eq!(snapshot.slider.as_ref().map(|s| s.zoom_in_disabled), Some(false));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["overlays"][1]["key"], "lg");
        assert!(json["tiles"][0]["url"].is_string());
    }

    #[tokio::test]
    async fn test_box_zoom_button_toggles_dragging() {
        let mut viewer = viewer("?path=out").await;
        viewer.toggle_box_zoom().unwrap();
        assert!(viewer.box_zoom().unwrap().is_active());
        assert!(!viewer.map().dragging_enabled());
        viewer.toggle_box_zoom().unwrap();
        assert!(viewer.map().dragging_enabled());
    }
}
