//! Drag-a-rectangle zooming.
//!
//! [`BoxZoomGesture`] is the gesture itself: it tracks a press point, grows a
//! drawn box while the pointer moves and turns the release into geographic
//! bounds. How the drawn box and the final bounds are derived is decided by a
//! [`BoxBoundsPolicy`] handed to the gesture when it is built. The map owns
//! one gesture for its native shift-drag zoom; [`BoxZoomControl`] owns another
//! behind a toggle button.

use crate::{
    constants::{BOX_ZOOM_ACTIVE_CLASS, BOX_ZOOM_SHRINK},
    core::{
        bounds::Bounds,
        geo::{LatLngBounds, Point},
        map::Map,
        viewport::Viewport,
    },
    input::events::{EventHandled, InputEvent, MapEvent, MouseButton},
    plugins::base::PluginTrait,
    ui::elements::{Button, ClassList, Position},
    Result,
};
use serde::{Deserialize, Serialize};

/// Pixel size of the box drawn for a pointer offset, per axis
fn shrunk(delta: f64) -> f64 {
    (delta.abs() - BOX_ZOOM_SHRINK).max(0.0)
}

/// Decides the drawn box and the container-pixel corners of the zoom result
pub trait BoxBoundsPolicy: Send + Sync {
    /// Size of the box drawn when the pointer is `offset` away from the press point
    fn box_size(&self, offset: Point) -> Point;

    /// Two opposite corners of the area to zoom to
    fn result_corners(&self, start: Point, end: Point, drawn: &Bounds) -> (Point, Point);
}

/// Zooms to the rectangle between press and release points
#[derive(Debug, Clone, Copy, Default)]
pub struct DragRectPolicy;

impl BoxBoundsPolicy for DragRectPolicy {
    fn box_size(&self, offset: Point) -> Point {
        Point::new(shrunk(offset.x), shrunk(offset.y))
    }

    fn result_corners(&self, start: Point, end: Point, _drawn: &Bounds) -> (Point, Point) {
        (start, end)
    }
}

/// Keeps the drawn box at `width / height == ratio` and zooms to exactly that box
#[derive(Debug, Clone, Copy)]
pub struct AspectRatioPolicy {
    ratio: f64,
}

impl AspectRatioPolicy {
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

impl BoxBoundsPolicy for AspectRatioPolicy {
    fn box_size(&self, offset: Point) -> Point {
        let width = shrunk(offset.x);
        Point::new(width, width / self.ratio)
    }

    fn result_corners(&self, _start: Point, _end: Point, drawn: &Bounds) -> (Point, Point) {
        (drawn.min, drawn.max)
    }
}

/// What a pointer event did to the gesture
#[derive(Debug, Clone, PartialEq)]
pub enum GestureStep {
    /// First movement after the press; the box appeared
    Started(Bounds),
    /// The box was resized
    Drawing(Bounds),
    /// Released over a non-empty area
    Finished(LatLngBounds),
    /// Released without moving, or over an empty area
    Aborted,
    /// The gesture was not running
    Ignored,
}

pub struct BoxZoomGesture {
    policy: Box<dyn BoxBoundsPolicy>,
    start: Option<Point>,
    drawn: Option<Bounds>,
}

impl BoxZoomGesture {
    pub fn new(policy: Box<dyn BoxBoundsPolicy>) -> Self {
        Self {
            policy,
            start: None,
            drawn: None,
        }
    }

    /// The policy matching the control options
    pub fn for_options(options: &BoxZoomOptions) -> Self {
        match options.aspect_ratio {
            Some(ratio) => Self::new(Box::new(AspectRatioPolicy::new(ratio))),
            None => Self::new(Box::new(DragRectPolicy)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    pub fn drawn_box(&self) -> Option<&Bounds> {
        self.drawn.as_ref()
    }

    /// Starts at container point `point`, discarding any gesture in progress
    pub fn begin(&mut self, point: Point) {
        self.start = Some(point);
        self.drawn = None;
    }

    pub fn move_to(&mut self, point: Point) -> GestureStep {
        let Some(start) = self.start else {
            return GestureStep::Ignored;
        };
        let first = self.drawn.is_none();
        let size = self.policy.box_size(point.subtract(&start));
        let drawn = Bounds::from_origin_and_size(start.min(&point), size.x, size.y);
        self.drawn = Some(drawn.clone());
        if first {
            GestureStep::Started(drawn)
        } else {
            GestureStep::Drawing(drawn)
        }
    }

    /// Ends the gesture at `point`, resolving the result against `viewport`
    pub fn finish(&mut self, point: Point, viewport: &Viewport) -> GestureStep {
        let start = self.start.take();
        let drawn = self.drawn.take();
        match (start, drawn) {
            (Some(start), Some(drawn)) => {
                let (a, b) = self.policy.result_corners(start, point, &drawn);
                let nw = viewport.container_point_to_lat_lng(&a);
                let se = viewport.container_point_to_lat_lng(&b);
                if nw.equals(&se) {
                    GestureStep::Aborted
                } else {
                    GestureStep::Finished(LatLngBounds::from_corners(nw, se))
                }
            }
            (Some(_), None) => GestureStep::Aborted,
            _ => GestureStep::Ignored,
        }
    }

    pub fn cancel(&mut self) {
        self.start = None;
        self.drawn = None;
    }
}

impl Default for BoxZoomGesture {
    fn default() -> Self {
        Self::new(Box::new(DragRectPolicy))
    }
}

impl std::fmt::Debug for BoxZoomGesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxZoomGesture")
            .field("start", &self.start)
            .field("drawn", &self.drawn)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxZoomOptions {
    pub position: Position,
    /// Hover text of the button
    pub title: String,
    /// Forces drawn boxes to `width / height == aspect_ratio`
    pub aspect_ratio: Option<f64>,
    /// Extra classes on the button
    pub div_classes: String,
    /// Use the map's own shift-drag instead of a dedicated mousedown hook
    pub enable_shift_drag: bool,
    /// Classes of an icon element inside the button; none means a background image
    pub icon_classes: String,
    pub icon_color: Option<String>,
    /// Stay on after a completed zoom
    pub keep_on: bool,
}

impl Default for BoxZoomOptions {
    fn default() -> Self {
        Self {
            position: Position::TopLeft,
            title: "Click here then draw a square on the map, to zoom in to an area".to_string(),
            aspect_ratio: None,
            div_classes: String::new(),
            enable_shift_drag: false,
            icon_classes: String::new(),
            icon_color: None,
            keep_on: false,
        }
    }
}

/// Icon element rendered inside the button
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    pub classes: ClassList,
    pub color: String,
}

/// Toggle button that arms a box-zoom gesture on plain mouse drags
pub struct BoxZoomControl {
    options: BoxZoomOptions,
    active: bool,
    button: Button,
    icon: Option<Icon>,
    gesture: BoxZoomGesture,
}

impl BoxZoomControl {
    pub const NAME: &'static str = "boxzoom";

    pub fn new(options: BoxZoomOptions) -> Self {
        let mut button = Button::new(options.title.clone(), "leaflet-control-boxzoom");
        let icon = if options.icon_classes.trim().is_empty() {
            button.classes.add("with-background-image");
            None
        } else {
            Some(Icon {
                classes: ClassList::parse(&options.icon_classes),
                color: options
                    .icon_color
                    .clone()
                    .unwrap_or_else(|| "black".to_string()),
            })
        };
        button.classes.add(&options.div_classes);

        Self {
            gesture: BoxZoomGesture::for_options(&options),
            options,
            active: false,
            button,
            icon,
        }
    }

    pub fn options(&self) -> &BoxZoomOptions {
        &self.options
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn button(&self) -> &Button {
        &self.button
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    pub fn gesture(&self) -> &BoxZoomGesture {
        &self.gesture
    }

    /// Button click
    pub fn toggle_state(&mut self, map: &mut Map) {
        if self.active {
            self.set_state_off(map);
        } else {
            self.set_state_on(map);
        }
    }

    pub fn set_state_on(&mut self, map: &mut Map) {
        self.button.classes.add(BOX_ZOOM_ACTIVE_CLASS);
        self.active = true;
        map.disable_dragging();
        if !self.options.enable_shift_drag {
            map.enable_box_zoom();
        }
        map.add_container_class(BOX_ZOOM_ACTIVE_CLASS);
        log::debug!("box zoom on");
    }

    pub fn set_state_off(&mut self, map: &mut Map) {
        self.button.classes.remove(BOX_ZOOM_ACTIVE_CLASS);
        self.active = false;
        self.gesture.cancel();
        map.enable_dragging();
        if !self.options.enable_shift_drag {
            map.disable_box_zoom();
        }
        map.remove_container_class(BOX_ZOOM_ACTIVE_CLASS);
        log::debug!("box zoom off");
    }
}

impl PluginTrait for BoxZoomControl {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn position(&self) -> Position {
        self.options.position
    }

    fn on_add(&mut self, map: &mut Map) -> Result<()> {
        map.set_box_zoom_gesture(BoxZoomGesture::for_options(&self.options));
        self.set_state_off(map);
        Ok(())
    }

    fn on_remove(&mut self, map: &mut Map) -> Result<()> {
        self.set_state_off(map);
        map.set_box_zoom_gesture(BoxZoomGesture::default());
        if map.options().box_zoom {
            map.enable_box_zoom();
        }
        Ok(())
    }

    fn handle_input(&mut self, input: &InputEvent, map: &mut Map) -> Result<EventHandled> {
        if !self.active {
            return Ok(EventHandled::NotHandled);
        }
        match input {
            InputEvent::MouseDown {
                position,
                button: MouseButton::Left,
                modifiers,
            } => {
                if self.options.enable_shift_drag && !modifiers.shift {
                    return Ok(EventHandled::NotHandled);
                }
                self.gesture.begin(*position);
                Ok(EventHandled::Handled)
            }
            _ => Ok(map.drive_box_zoom(&mut self.gesture, input)),
        }
    }

    fn on_map_event(&mut self, event: &MapEvent, map: &mut Map) -> Result<()> {
        if let MapEvent::BoxZoomEnd { .. } = event {
            if self.active && !self.options.keep_on {
                self.set_state_off(map);
            }
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
    use crate::{core::geo::LatLng, input::events::KeyModifiers};

    fn viewport() -> Viewport {
        Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_aspect_ratio_constrains_height() {
        let mut gesture = BoxZoomGesture::new(Box::new(AspectRatioPolicy::new(2.0)));
        gesture.begin(Point::new(10.0, 10.0));
        let step = gesture.move_to(Point::new(114.0, 30.0));
        let GestureStep::Started(drawn) = step else {
            panic!("expected the first move to start the box, got {:?}", step);
        };
        assert_eq!(drawn.width(), 100.0);
        assert_eq!(drawn.height(), 50.0);

        let GestureStep::Finished(bounds) = gesture.finish(Point::new(114.0, 30.0), &viewport())
        else {
            panic!("expected bounds");
        };
        assert!((bounds.north_east.lng - bounds.south_west.lng - 100.0).abs() < 1e-9);
        assert!((bounds.north_east.lat - bounds.south_west.lat - 50.0).abs() < 1e-9);
        assert!(!gesture.is_active());
    }

    #[test]
    fn test_drag_rect_uses_release_point() {
        let mut gesture = BoxZoomGesture::default();
        gesture.begin(Point::new(400.0, 300.0));
        assert!(matches!(gesture.move_to(Point::new(380.0, 310.0)), GestureStep::Started(_)));
        let step = gesture.move_to(Point::new(300.0, 350.0));
        assert_eq!(
            step,
            GestureStep::Drawing(Bounds::from_coords(300.0, 300.0, 396.0, 346.0))
        );

        let GestureStep::Finished(bounds) = gesture.finish(Point::new(300.0, 350.0), &viewport())
        else {
            panic!("expected bounds");
        };
        assert_eq!(bounds.north_east, LatLng::new(0.0, 0.0));
        assert_eq!(bounds.south_west, LatLng::new(-50.0, -100.0));
    }

    #[test]
    fn test_degenerate_and_motionless_gestures_abort() {
        let mut gesture = BoxZoomGesture::new(Box::new(AspectRatioPolicy::new(1.0)));
        gesture.begin(Point::new(50.0, 50.0));
        gesture.move_to(Point::new(52.0, 80.0));
        // |dx| - 4 < 0, so the drawn box is empty
        assert_eq!(gesture.finish(Point::new(52.0, 80.0), &viewport()), GestureStep::Aborted);

        gesture.begin(Point::new(50.0, 50.0));
        assert_eq!(gesture.finish(Point::new(50.0, 50.0), &viewport()), GestureStep::Aborted);
        assert_eq!(gesture.finish(Point::new(50.0, 50.0), &viewport()), GestureStep::Ignored);
    }

    #[test]
    fn test_control_shapes_native_shift_drag() {
        let mut map = Map::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0));
        let control = BoxZoomControl::new(BoxZoomOptions {
            aspect_ratio: Some(2.0),
            enable_shift_drag: true,
            ..Default::default()
        });
        map.add_plugin(Box::new(control)).unwrap();
        map.process_events();

        let down = InputEvent::primary_down(Point::new(100.0, 100.0), KeyModifiers::shift());
        map.handle_input(&down).unwrap();
        map.handle_input(&InputEvent::MouseMove {
            position: Point::new(204.0, 304.0),
        })
        .unwrap();
        map.handle_input(&InputEvent::MouseUp {
            position: Point::new(204.0, 304.0),
        })
        .unwrap();

        // fitted to the 100x50 drawn box at (100, 100), not the raw drag
        assert_eq!(map.get_zoom(), 3.0);
        assert_eq!(map.get_center(), LatLng::new(175.0, -250.0));

        map.remove_plugin(BoxZoomControl::NAME).unwrap();
        map.handle_input(&down).unwrap();
        map.handle_input(&InputEvent::MouseMove {
            position: Point::new(204.0, 304.0),
        })
        .unwrap();
        let drawn = map.box_zoom_gesture().drawn_box().cloned().unwrap();
        assert_eq!((drawn.width(), drawn.height()), (100.0, 200.0));
    }

    #[test]
    fn test_button_classes() {
        let control = BoxZoomControl::new(BoxZoomOptions {
            div_classes: "custom".into(),
            ..Default::default()
        });
        assert_eq!(
            control.button().classes.to_string(),
            "leaflet-control-boxzoom with-background-image custom"
        );
        assert!(control.icon().is_none());

        let control = BoxZoomControl::new(BoxZoomOptions {
            icon_classes: "fa fa-search".into(),
            ..Default::default()
        });
        assert!(!control.button().classes.contains("with-background-image"));
        assert_eq!(control.icon().map(|i| i.color.as_str()), Some("black"));
    }
}
