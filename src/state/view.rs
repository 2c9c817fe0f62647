use crate::{
    constants::{PARAM_X, PARAM_Y, PARAM_Z},
    core::{
        map::Map,
        mapper::{CoordinateMapper, WorldPoint},
    },
    state::{
        query::{parse_number, to_fixed, QueryParams},
        store::ParamStore,
    },
    Result,
};
use std::collections::BTreeMap;

/// Camera position and overlay visibility as stored in the URL.
///
/// The camera is in world coordinates. `overlays` only holds keys whose
/// visibility is pinned; a key that is absent keeps the layer's default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub center: WorldPoint,
    pub zoom: f64,
    pub overlays: BTreeMap<String, bool>,
}

impl ViewState {
    pub fn new(center: WorldPoint, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            overlays: BTreeMap::new(),
        }
    }

    pub fn with_overlay(mut self, key: &str, visible: bool) -> Self {
        self.overlays.insert(key.to_string(), visible);
        self
    }

    /// Reads `x`, `y`, `z` and the `"0"`/`"1"` value of each overlay key
    pub fn from_params<'a>(
        params: &QueryParams,
        overlay_keys: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let center = WorldPoint::new(
            parse_number(params.get(PARAM_X)),
            parse_number(params.get(PARAM_Y)),
        );
        let overlays = overlay_keys
            .into_iter()
            .filter_map(|key| match params.get(key) {
                Some("1") => Some((key.to_string(), true)),
                Some("0") => Some((key.to_string(), false)),
                _ => None,
            })
            .collect();
        Self {
            center,
            zoom: parse_number(params.get(PARAM_Z)),
            overlays,
        }
    }

    pub fn load<'a, S: ParamStore + ?Sized>(
        store: &S,
        overlay_keys: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        Ok(Self::from_params(&store.read()?, overlay_keys))
    }

    /// Camera of `map`, in world coordinates
    pub fn from_map(map: &Map, mapper: &CoordinateMapper) -> Self {
        Self::new(mapper.lat_lng_to_world(&map.get_center()), map.get_zoom())
    }

    /// Writes the camera with one decimal and every pinned overlay key
    pub fn write_params(&self, params: &mut QueryParams) {
        params.set(PARAM_X, to_fixed(self.center.x, 1));
        params.set(PARAM_Y, to_fixed(self.center.y, 1));
        params.set(PARAM_Z, to_fixed(self.zoom, 1));
        for (key, visible) in &self.overlays {
            params.set(key, if *visible { "1" } else { "0" });
        }
    }

    /// Read-modify-replace of the store's current snapshot
    pub fn save<S: ParamStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        let mut params = store.read()?;
        self.write_params(&mut params);
        store.replace(&params)
    }

    /// Moves the map camera here; the map snaps and clamps the zoom
    pub fn apply_camera(&self, map: &mut Map, mapper: &CoordinateMapper) -> Result<()> {
        map.set_view(mapper.point_to_lat_lng(&self.center), self.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::MemoryStore;

    const KEYS: [&str; 3] = ["lt", "lg", "ld"];

    #[test]
    fn test_from_params() {
        let params = QueryParams::parse("?x=10&y=20&z=3&lt=0&lg=1&ld=yes");
        let state = ViewState::from_params(&params, KEYS);
        assert_eq!(state.center, WorldPoint::new(10.0, 20.0));
        assert_eq!(state.zoom, 3.0);
        assert_eq!(state.overlays.get("lt"), Some(&false));
        assert_eq!(state.overlays.get("lg"), Some(&true));
        assert_eq!(state.overlays.get("ld"), None);
    }

    #[test]
    fn test_each_coordinate_defaults_independently() {
        let params = QueryParams::parse("?x=abc&y=7&z=");
        let state = ViewState::from_params(&params, KEYS);
        assert_eq!(state.center, WorldPoint::new(0.0, 7.0));
        assert_eq!(state.zoom, 0.0);

        let empty = ViewState::from_params(&QueryParams::new(), KEYS);
        assert_eq!(empty, ViewState::default());
    }

    #[test]
    fn test_save_rounds_to_one_decimal() {
        let mut store = MemoryStore::from_query("?path=out%2F&lt=1");
        ViewState::new(WorldPoint::new(5.5, -3.25), 2.0)
            .save(&mut store)
            .unwrap();
        assert_eq!(store.query_string(), "path=out%2F&lt=1&x=5.5&y=-3.3&z=2.0");

        ViewState::new(WorldPoint::new(0.0, 0.0), 1.0)
            .with_overlay("lt", false)
            .save(&mut store)
            .unwrap();
        assert_eq!(store.query_string(), "path=out%2F&lt=0&x=0.0&y=0.0&z=1.0");
        assert_eq!(store.history().len(), 2);
    }
}
