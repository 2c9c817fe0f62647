//! Keeps the URL query string in step with the map.
//!
//! At startup [`ViewStateSync::apply_initial`] moves the camera and pins
//! overlays from the query. Afterwards every camera change rewrites `x`, `y`,
//! `z` and every overlay toggle rewrites that overlay's key. Each write reads
//! the store's current snapshot and replaces it whole, so concurrent writers
//! resolve as last-write-wins.

use crate::{
    core::{map::Map, mapper::CoordinateMapper},
    input::events::MapEvent,
    state::{store::ParamStore, view::ViewState},
    Result,
};

#[derive(Debug, Clone, PartialEq)]
struct OverlayKey {
    layer_id: String,
    key: String,
}

pub struct ViewStateSync<S: ParamStore> {
    store: S,
    mapper: CoordinateMapper,
    overlays: Vec<OverlayKey>,
}

impl<S: ParamStore> ViewStateSync<S> {
    pub fn new(store: S, mapper: CoordinateMapper) -> Self {
        Self {
            store,
            mapper,
            overlays: Vec::new(),
        }
    }

    /// Stores the visibility of `layer_id` under the query key `key`
    pub fn register_overlay(&mut self, layer_id: &str, key: &str) {
        self.overlays.retain(|o| o.layer_id != layer_id);
        self.overlays.push(OverlayKey {
            layer_id: layer_id.to_string(),
            key: key.to_string(),
        });
    }

    pub fn overlay_key(&self, layer_id: &str) -> Option<&str> {
        self.overlays
            .iter()
            .find(|o| o.layer_id == layer_id)
            .map(|o| o.key.as_str())
    }

    /// Layer stored under query key `key`
    pub fn overlay_layer(&self, key: &str) -> Option<&str> {
        self.overlays
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.layer_id.as_str())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Applies the state found in the store to `map` and returns it.
    ///
    /// Events this queues on the map are the caller's to discard or deliver;
    /// they are not written back.
    pub fn apply_initial(&mut self, map: &mut Map) -> Result<ViewState> {
        let state = ViewState::load(&self.store, self.overlays.iter().map(|o| o.key.as_str()))?;
        log::info!(
            "initial view: world ({}, {}) zoom {}",
            state.center.x,
            state.center.y,
            state.zoom
        );
        state.apply_camera(map, &self.mapper)?;

        for (key, visible) in &state.overlays {
            let Some(overlay) = self.overlays.iter().find(|o| &o.key == key) else {
                continue;
            };
            let applied = if *visible {
                map.show_layer(&overlay.layer_id)
            } else {
                map.hide_layer(&overlay.layer_id)
            };
            if let Err(e) = applied {
                log::warn!("cannot apply overlay {}={}: {}", key, visible, e);
            }
        }
        Ok(state)
    }

    /// Writes the parts of the URL state `event` changed
    pub fn on_map_event(&mut self, event: &MapEvent, map: &Map) {
        let written = match event {
            event if event.is_view_change() => self.write_camera(map),
            MapEvent::OverlayAdd { layer_id, .. } => self.write_overlay(layer_id, true),
            MapEvent::OverlayRemove { layer_id, .. } => self.write_overlay(layer_id, false),
            _ => return,
        };
        if let Err(e) = written {
            log::warn!("failed to update URL state on {}: {}", event.event_type(), e);
        }
    }

    fn write_camera(&mut self, map: &Map) -> Result<()> {
        let state = ViewState::from_map(map, &self.mapper);
        log::debug!("camera -> world ({}, {}) zoom {}", state.center.x, state.center.y, state.zoom);
        state.save(&mut self.store)
    }

    fn write_overlay(&mut self, layer_id: &str, visible: bool) -> Result<()> {
        let Some(key) = self.overlay_key(layer_id).map(str::to_string) else {
            log::warn!("overlay change for unknown layer {}", layer_id);
            return Ok(());
        };
        let mut params = self.store.read()?;
        params.set(&key, if visible { "1" } else { "0" });
        self.store.replace(&params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            geo::{LatLng, Point},
            map::MapOptions,
            mapper::WorldPoint,
            viewport::Viewport,
        },
        layers::group::LayerGroup,
        state::{query::QueryParams, store::MemoryStore},
        Error,
    };

    fn map_with_overlays(stations_visible: bool) -> Map {
        let options = MapOptions {
            zoom_snap: 0.1,
            zoom_control: false,
            ..Default::default()
        };
        let mut map = Map::with_options(
            Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0)),
            options,
        );
        let stations = LayerGroup::new("lt", "Train stations").with_visible(stations_visible);
        map.add_overlay(Box::new(stations), "Train stations").unwrap();
        map.add_overlay(Box::new(LayerGroup::new("lg", "Tags").with_visible(false)), "Tags")
            .unwrap();
        map.process_events();
        map
    }

    fn sync(query: &str) -> ViewStateSync<MemoryStore> {
        let mut sync = ViewStateSync::new(MemoryStore::from_query(query), CoordinateMapper::new(256.0, 256.0));
        sync.register_overlay("lt", "lt");
        sync.register_overlay("lg", "lg");
        sync
    }

    fn pump(sync: &mut ViewStateSync<MemoryStore>, map: &mut Map) {
        for event in map.process_events() {
            sync.on_map_event(&event, map);
        }
    }

    #[test]
    fn test_initial_camera_from_query() {
        let mut map = map_with_overlays(false);
        let mut sync = sync("?x=10&y=20&z=3");
        let state = sync.apply_initial(&mut map).unwrap();
        assert_eq!(state.center, WorldPoint::new(10.0, 20.0));
        assert_eq!(map.get_center(), LatLng::new(-20.0, 10.0));
        assert_eq!(map.get_zoom(), 3.0);
        map.clear_events();
        assert!(sync.store().history().is_empty());
    }

    #[test]
    fn test_overlay_keys_pin_visibility() {
        let mut map = map_with_overlays(true);
        let mut sync = sync("?lt=0&lg=1");
        sync.apply_initial(&mut map).unwrap();
        assert!(!map.has_layer("lt"));
        assert!(map.has_layer("lg"));
    }

    #[test]
    fn test_camera_change_rewrites_xyz() {
        let mut map = map_with_overlays(false);
        let mut sync = sync("?path=out%2F");
        map.set_view(LatLng::new(3.25, 5.5), 2.0).unwrap();
        pump(&mut sync, &mut map);

        let query = sync.store().query_string();
        assert!(query.contains("x=5.5&y=-3.3&z=2.0"), "{}", query);
        assert!(query.starts_with("path=out%2F"));
    }

    #[test]
    fn test_toggle_writes_in_sequence() {
        let mut map = map_with_overlays(true);
        let mut sync = sync("");
        map.toggle_layer("lt").unwrap();
        pump(&mut sync, &mut map);
        map.toggle_layer("lt").unwrap();
        pump(&mut sync, &mut map);

        assert_eq!(sync.store().history(), ["lt=0".to_string(), "lt=1".to_string()]);
    }

    #[test]
    fn test_unknown_overlay_is_ignored() {
        let mut map = map_with_overlays(false);
        let mut sync = ViewStateSync::new(MemoryStore::new(), CoordinateMapper::default());
        map.show_layer("lt").unwrap();
        pump(&mut sync, &mut map);
        assert!(sync.store().history().is_empty());
    }

    struct FailingStore;

    impl ParamStore for FailingStore {
        fn read(&self) -> Result<QueryParams> {
            Ok(QueryParams::new())
        }

        fn replace(&mut self, _params: &QueryParams) -> Result<()> {
            Err(Error::Store("read-only".to_string()))
        }
    }

    #[test]
    fn test_failing_store_does_not_stop_events() {
        let mut map = map_with_overlays(false);
        let mut sync = ViewStateSync::new(FailingStore, CoordinateMapper::default());
        sync.register_overlay("lt", "lt");
        map.set_zoom(1.0).unwrap();
        map.show_layer("lt").unwrap();
        let events = map.process_events();
        for event in &events {
            sync.on_map_event(event, &map);
        }
        assert_eq!(events.len(), 4);
    }
}
