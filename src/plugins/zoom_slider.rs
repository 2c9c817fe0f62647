//! Vertical zoom slider: a plus button, a track with a draggable knob and a
//! minus button stacked in one bar.

use crate::{
    constants::{SHIFT_ZOOM_DELTA, SLIDER_KNOB_HEIGHT, SLIDER_STEP_HEIGHT},
    core::map::Map,
    input::events::MapEvent,
    plugins::base::PluginTrait,
    ui::elements::{Button, Position},
    Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSliderOptions {
    pub position: Position,
    /// Track height of one zoom level, in pixels
    pub step_height: f64,
    /// Knob height including its border, in pixels
    pub knob_height: f64,
    /// Prefix of every CSS class the slider uses
    pub style_ns: String,
}

impl Default for ZoomSliderOptions {
    fn default() -> Self {
        Self {
            position: Position::TopLeft,
            step_height: SLIDER_STEP_HEIGHT,
            knob_height: SLIDER_KNOB_HEIGHT,
            style_ns: "leaflet-control-zoomslider".to_string(),
        }
    }
}

/// The slider knob: a y offset inside the track, linear in the zoom value.
///
/// `y = k * value + m`, so value 0 sits at the bottom of the track.
#[derive(Debug, Clone, PartialEq)]
pub struct Knob {
    step_height: f64,
    knob_height: f64,
    k: f64,
    m: f64,
    max_value: f64,
    y: f64,
}

impl Knob {
    pub fn new(step_height: f64, knob_height: f64) -> Self {
        let mut knob = Self {
            step_height,
            knob_height,
            k: -step_height,
            m: 0.0,
            max_value: 0.0,
            y: 0.0,
        };
        knob.set_steps(0.0);
        knob
    }

    fn to_y(&self, value: f64) -> f64 {
        self.k * value + self.m
    }

    fn to_value(&self, y: f64) -> f64 {
        (y - self.m) / self.k
    }

    /// Clamps `y` to the track in value space; no rounding to whole levels
    fn adjust(&self, y: f64) -> f64 {
        let value = self.to_value(y).min(self.max_value).max(0.0);
        self.to_y(value)
    }

    pub fn set_steps(&mut self, steps: f64) {
        let slider_height = steps * self.step_height;
        self.max_value = steps - 1.0;
        self.k = -self.step_height;
        self.m = slider_height - (self.step_height + self.knob_height) / 2.0;
    }

    pub fn set_position(&mut self, y: f64) {
        self.y = self.adjust(y);
    }

    pub fn set_value(&mut self, value: f64) {
        self.set_position(self.to_y(value));
    }

    pub fn get_value(&self) -> f64 {
        self.to_value(self.y)
    }

    /// Current y offset inside the track
    pub fn position(&self) -> f64 {
        self.y
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }
}

#[derive(Debug, Clone, Copy)]
struct KnobDrag {
    pointer_start: f64,
    knob_start: f64,
    moved: bool,
}

pub struct ZoomSliderControl {
    options: ZoomSliderOptions,
    knob: Knob,
    body_height: f64,
    zoom_in: Button,
    zoom_out: Button,
    drag: Option<KnobDrag>,
}

impl ZoomSliderControl {
    pub const NAME: &'static str = "zoomslider";

    pub fn new(options: ZoomSliderOptions) -> Self {
        let ns = options.style_ns.clone();
        Self {
            knob: Knob::new(options.step_height, options.knob_height),
            body_height: 0.0,
            zoom_in: Button::new(
                "Zoom in",
                &format!("{}-in leaflet-bar-part leaflet-bar-part-top", ns),
            ),
            zoom_out: Button::new(
                "Zoom out",
                &format!("{}-out leaflet-bar-part leaflet-bar-part-bottom", ns),
            ),
            drag: None,
            options,
        }
    }

    pub fn options(&self) -> &ZoomSliderOptions {
        &self.options
    }

    pub fn knob(&self) -> &Knob {
        &self.knob
    }

    /// Track height in pixels
    pub fn body_height(&self) -> f64 {
        self.body_height
    }

    pub fn zoom_in_button(&self) -> &Button {
        &self.zoom_in
    }

    pub fn zoom_out_button(&self) -> &Button {
        &self.zoom_out
    }

    fn disabled_class(&self) -> String {
        format!("{}-disabled", self.options.style_ns)
    }

    /// Number of whole zoom levels the map allows; 0 when unbounded
    pub fn zoom_levels(map: &Map) -> f64 {
        let levels = map.max_zoom() - map.min_zoom() + 1.0;
        if levels < f64::INFINITY {
            levels
        } else {
            0.0
        }
    }

    pub fn update_size(&mut self, map: &Map) {
        let steps = Self::zoom_levels(map);
        self.body_height = self.options.step_height * steps;
        self.knob.set_steps(steps);
    }

    pub fn update_knob_value(&mut self, map: &Map) {
        self.knob.set_value(map.get_zoom() - map.min_zoom());
    }

    pub fn update_disabled(&mut self, map: &Map) {
        let class = self.disabled_class();
        let zoom = map.get_zoom();

        self.zoom_in.classes.remove(&class);
        self.zoom_out.classes.remove(&class);
        self.zoom_in.disabled = false;
        self.zoom_out.disabled = false;

        if zoom == map.min_zoom() {
            self.zoom_out.classes.add(&class);
            self.zoom_out.disabled = true;
        }
        if zoom == map.max_zoom() {
            self.zoom_in.classes.add(&class);
            self.zoom_in.disabled = true;
        }
    }

    fn update_map_zoom(&self, map: &mut Map) -> Result<()> {
        map.set_zoom(self.knob.get_value() + map.min_zoom())
    }

    /// Click on the track at `y` pixels from its top
    pub fn click_track(&mut self, y: f64, map: &mut Map) -> Result<()> {
        self.knob.set_position(y);
        self.update_map_zoom(map)
    }

    pub fn start_knob_drag(&mut self, pointer_y: f64) {
        self.drag = Some(KnobDrag {
            pointer_start: pointer_y,
            knob_start: self.knob.position(),
            moved: false,
        });
    }

    pub fn drag_knob(&mut self, pointer_y: f64) {
        if let Some(drag) = self.drag.as_mut() {
            drag.moved = true;
            let y = drag.knob_start + (pointer_y - drag.pointer_start);
            self.knob.set_position(y);
        }
    }

    /// Releasing a knob that moved commits its value to the map
    pub fn end_knob_drag(&mut self, map: &mut Map) -> Result<()> {
        match self.drag.take() {
            Some(drag) if drag.moved => self.update_map_zoom(map),
            _ => Ok(()),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn zoom_in(&mut self, shift: bool, map: &mut Map) -> Result<()> {
        if self.zoom_in.disabled {
            return Ok(());
        }
        let delta = if shift {
            SHIFT_ZOOM_DELTA
        } else {
            map.options().zoom_delta
        };
        map.zoom_in(Some(delta))
    }

    pub fn zoom_out(&mut self, shift: bool, map: &mut Map) -> Result<()> {
        if self.zoom_out.disabled {
            return Ok(());
        }
        let delta = if shift {
            SHIFT_ZOOM_DELTA
        } else {
            map.options().zoom_delta
        };
        map.zoom_out(Some(delta))
    }
}

impl PluginTrait for ZoomSliderControl {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn position(&self) -> Position {
        self.options.position
    }

    fn on_add(&mut self, map: &mut Map) -> Result<()> {
        self.update_size(map);
        self.update_knob_value(map);
        self.update_disabled(map);
        Ok(())
    }

    fn on_map_event(&mut self, event: &MapEvent, map: &mut Map) -> Result<()> {
        match event {
            MapEvent::ZoomLevelsChange { .. } => {
                self.update_size(map);
                self.update_knob_value(map);
                self.update_disabled(map);
            }
            MapEvent::ZoomEnd { .. } => {
                self.update_knob_value(map);
                self.update_disabled(map);
            }
            _ => {}
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            geo::{LatLng, Point},
            map::MapOptions,
            viewport::Viewport,
        },
        layers::tile::{TileLayer, TileLayerOptions},
        tiles::source::MapshotTileSource,
    };

    fn slider_map() -> Map {
        let options = MapOptions {
            zoom_control: false,
            zoom_slider_control: true,
            ..Default::default()
        };
        let mut map = Map::with_options(
            Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(512.0, 512.0)),
            options,
        );
        let layer = TileLayer::new(
            "base".into(),
            "Base".into(),
            Box::new(MapshotTileSource::new("")),
            TileLayerOptions {
                min_zoom: 0.0,
                max_zoom: 4.0,
                ..Default::default()
            },
        );
        map.add_layer(Box::new(layer)).unwrap();
        map.process_events();
        map
    }

    #[test]
    fn test_knob_value_round_trip() {
        let mut knob = Knob::new(8.0, 6.0);
        knob.set_steps(5.0);
        knob.set_value(2.0);
        assert_eq!(knob.get_value(), 2.0);
        // m = 40 - 7, y = -8 * 2 + 33
        assert_eq!(knob.position(), 17.0);
    }

    #[test]
    fn test_knob_clamps_without_rounding() {
        let mut knob = Knob::new(8.0, 6.0);
        knob.set_steps(5.0);
        knob.set_value(10.0);
        assert_eq!(knob.get_value(), 4.0);
        knob.set_value(-3.0);
        assert_eq!(knob.get_value(), 0.0);
        knob.set_value(1.25);
        assert_eq!(knob.get_value(), 1.25);
    }

    #[test]
    fn test_unbounded_track_pins_knob() {
        let mut knob = Knob::new(8.0, 6.0);
        knob.set_steps(0.0);
        knob.set_value(3.0);
        assert_eq!(knob.get_value(), 0.0);
    }

    #[test]
    fn test_button_classes() {
        let control = ZoomSliderControl::new(ZoomSliderOptions::default());
        assert_eq!(
            control.zoom_in_button().classes.to_string(),
            "leaflet-control-zoomslider-in leaflet-bar-part leaflet-bar-part-top"
        );
        assert_eq!(control.zoom_out_button().title, "Zoom out");
    }

    #[test]
    fn test_slider_tracks_zoom_levels() {
        let mut map = slider_map();
        let slider = map
            .plugin::<ZoomSliderControl>(ZoomSliderControl::NAME)
            .unwrap();
        assert_eq!(slider.body_height(), 40.0);
        assert_eq!(slider.knob().max_value(), 4.0);
        assert!(slider.zoom_out_button().disabled);

        map.set_zoom(3.0).unwrap();
        map.process_events();
        let slider = map
            .plugin::<ZoomSliderControl>(ZoomSliderControl::NAME)
            .unwrap();
        assert_eq!(slider.knob().get_value(), 3.0);
        assert!(!slider.zoom_out_button().disabled);
    }

    #[test]
    fn test_shift_click_zooms_by_two() {
        let mut map = slider_map();
        map.with_plugin_mut::<ZoomSliderControl, _, _>(ZoomSliderControl::NAME, |slider, map| {
            slider.zoom_in(true, map)
        })
        .unwrap()
        .unwrap();
        assert_eq!(map.get_zoom(), 2.0);

        // zoom-out is still disabled until zoomend is processed
        map.with_plugin_mut::<ZoomSliderControl, _, _>(ZoomSliderControl::NAME, |slider, map| {
            slider.zoom_out(false, map)
        })
        .unwrap()
        .unwrap();
        assert_eq!(map.get_zoom(), 2.0);
    }

    #[test]
    fn test_knob_drag_commits_only_when_moved() {
        let mut map = slider_map();
        map.with_plugin_mut::<ZoomSliderControl, _, _>(ZoomSliderControl::NAME, |slider, map| {
            slider.start_knob_drag(20.0);
            slider.end_knob_drag(map)
        })
        .unwrap()
        .unwrap();
        assert_eq!(map.get_zoom(), 0.0);

        map.with_plugin_mut::<ZoomSliderControl, _, _>(ZoomSliderControl::NAME, |slider, map| {
            slider.start_knob_drag(20.0);
            // two levels up the track
            slider.drag_knob(4.0);
            assert!(slider.is_dragging());
            slider.end_knob_drag(map)
        })
        .unwrap()
        .unwrap();
        assert_eq!(map.get_zoom(), 2.0);
    }
}
