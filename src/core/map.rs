use crate::{
    core::{
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    input::{
        events::{EventHandled, InputEvent, MapEvent, MouseButton},
        handler::{DragAction, DragHandler, EventManager},
    },
    layers::{base::LayerTrait, manager::LayerManager},
    plugins::{
        base::PluginTrait,
        box_zoom::{BoxZoomGesture, GestureStep},
        zoom_slider::{ZoomSliderControl, ZoomSliderOptions},
    },
    prelude::HashMap,
    ui::{elements::ClassList, layers_control::LayersControl, zoom_control::ZoomControl},
    Error, Result,
};

/// Upper bound on drain rounds in one `process_events` call
const MAX_EVENT_ROUNDS: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    /// Pointer-drag panning
    pub dragging: bool,
    /// Native shift-drag box zoom
    pub box_zoom: bool,
    /// Fixed zoom limits; `None` derives them from the layers on the map
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    /// Add the plain +/- zoom buttons
    pub zoom_control: bool,
    /// Add the zoom slider
    pub zoom_slider_control: bool,
    pub zoom_slider: ZoomSliderOptions,
    /// Zoom levels snap to multiples of this value; 0 disables snapping
    pub zoom_snap: f64,
    /// Step of `zoom_in`/`zoom_out`
    pub zoom_delta: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            dragging: true,
            box_zoom: true,
            min_zoom: None,
            max_zoom: None,
            zoom_control: true,
            zoom_slider_control: false,
            zoom_slider: ZoomSliderOptions::default(),
            zoom_snap: 1.0,
            zoom_delta: 1.0,
        }
    }
}

/// Headless Leaflet-style map: camera, layers, controls and an event queue.
///
/// Operations that change state queue [`MapEvent`]s; nothing is delivered
/// until [`Map::process_events`] runs.
pub struct Map {
    pub viewport: Viewport,
    options: MapOptions,
    layer_manager: LayerManager,
    layers_control: LayersControl,
    plugins: HashMap<String, Box<dyn PluginTrait>>,
    /// Plugin names in the order they were added
    plugin_order: Vec<String>,
    event_manager: EventManager,
    drag: DragHandler,
    box_zoom_enabled: bool,
    box_zoom: BoxZoomGesture,
    container_classes: ClassList,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        let viewport = Viewport::new(center, zoom, size);
        Self::with_options(viewport, MapOptions::default())
    }

    pub fn with_options(viewport: Viewport, options: MapOptions) -> Self {
        let mut map = Self {
            viewport,
            layer_manager: LayerManager::new(),
            layers_control: LayersControl::new(),
            plugins: HashMap::default(),
            plugin_order: Vec::new(),
            event_manager: EventManager::new(),
            drag: DragHandler::new(options.dragging),
            box_zoom_enabled: options.box_zoom,
            box_zoom: BoxZoomGesture::default(),
            container_classes: ClassList::parse("leaflet-container"),
            options,
        };

        let (min_zoom, max_zoom) = (map.min_zoom(), map.max_zoom());
        map.viewport.set_zoom_limits(min_zoom, max_zoom);

        // the slider replaces the plain buttons
        if map.options.zoom_control && !map.options.zoom_slider_control {
            if let Err(e) = map.add_plugin(Box::new(ZoomControl::new())) {
                log::warn!("zoom control not added: {}", e);
            }
        }
        if map.options.zoom_slider_control {
            let slider = ZoomSliderControl::new(map.options.zoom_slider.clone());
            if let Err(e) = map.add_plugin(Box::new(slider)) {
                log::warn!("zoom slider not added: {}", e);
            }
        }

        map
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn get_center(&self) -> LatLng {
        self.viewport.center
    }

    pub fn get_zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn get_size(&self) -> Point {
        self.viewport.size
    }

    pub fn get_bounds(&self) -> LatLngBounds {
        self.viewport.bounds()
    }

    pub fn min_zoom(&self) -> f64 {
        self.options
            .min_zoom
            .unwrap_or_else(|| self.layer_manager.zoom_range().0.unwrap_or(0.0))
    }

    pub fn max_zoom(&self) -> f64 {
        self.options
            .max_zoom
            .unwrap_or_else(|| self.layer_manager.zoom_range().1.unwrap_or(f64::INFINITY))
    }

    /// Snaps to `zoom_snap` and clamps to the zoom limits
    pub fn limit_zoom(&self, zoom: f64) -> f64 {
        self.viewport.limit_zoom(zoom, self.options.zoom_snap)
    }

    /// Moves the camera. Emits `ZoomEnd` when the zoom changed and `MoveEnd` always.
    pub fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        if !center.is_finite() {
            return Err(Error::InvalidView(format!(
                "center ({}, {}) is not finite",
                center.lat, center.lng
            )));
        }
        if zoom.is_nan() {
            return Err(Error::InvalidView("zoom is NaN".to_string()));
        }
        let zoom = self.limit_zoom(zoom);
        if !zoom.is_finite() {
            return Err(Error::InvalidView(format!("zoom {} is not finite", zoom)));
        }

        let zoom_changed = zoom != self.viewport.zoom;
        self.viewport.center = center;
        self.viewport.zoom = zoom;

        if zoom_changed {
            self.emit(MapEvent::ZoomEnd { zoom });
        }
        self.emit(MapEvent::MoveEnd { center });
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<()> {
        self.set_view(self.viewport.center, zoom)
    }

    /// Zooms in by `delta`, or by `zoom_delta` when `None`
    pub fn zoom_in(&mut self, delta: Option<f64>) -> Result<()> {
        let delta = delta.unwrap_or_else(|| self.default_zoom_step());
        self.set_zoom(self.viewport.zoom + delta)
    }

    pub fn zoom_out(&mut self, delta: Option<f64>) -> Result<()> {
        let delta = delta.unwrap_or_else(|| self.default_zoom_step());
        self.set_zoom(self.viewport.zoom - delta)
    }

    fn default_zoom_step(&self) -> f64 {
        if self.options.zoom_snap > 0.0 {
            self.options.zoom_delta
        } else {
            1.0
        }
    }

    /// Centers on `bounds` at the largest snapped zoom that still shows all of it
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds) -> Result<()> {
        let zoom = self
            .viewport
            .bounds_zoom(bounds, Point::default(), self.options.zoom_snap);
        self.set_view(bounds.center(), zoom)
    }

    /// Shifts the view by a pixel offset
    pub fn pan_by(&mut self, offset: Point) {
        self.viewport.pan(&offset);
        self.emit(MapEvent::MoveEnd {
            center: self.viewport.center,
        });
    }

    /// Container size changed. The center stays put; no events when the
    /// rounded half-size is unchanged.
    pub fn resize(&mut self, size: Point) {
        let half = |p: Point| ((p.x / 2.0).round(), (p.y / 2.0).round());
        let unchanged = half(self.viewport.size) == half(size);
        self.viewport.size = size;
        if unchanged {
            return;
        }
        self.emit(MapEvent::MoveEnd {
            center: self.viewport.center,
        });
        self.emit(MapEvent::Resize { size });
    }

    /// Recomputes the zoom limits from the layers on the map
    pub fn update_zoom_levels(&mut self) -> Result<()> {
        let old = (self.viewport.min_zoom, self.viewport.max_zoom);
        let (min_zoom, max_zoom) = (self.min_zoom(), self.max_zoom());
        self.viewport.set_zoom_limits(min_zoom, max_zoom);

        if old != (min_zoom, max_zoom) {
            self.emit(MapEvent::ZoomLevelsChange { min_zoom, max_zoom });
        }

        let (layers_min, layers_max) = self.layer_manager.zoom_range();
        let zoom = self.viewport.zoom;
        if let (None, Some(max)) = (self.options.max_zoom, layers_max) {
            if zoom > max {
                self.set_zoom(max)?;
            }
        }
        if let (None, Some(min)) = (self.options.min_zoom, layers_min) {
            if zoom < min {
                self.set_zoom(min)?;
            }
        }
        Ok(())
    }

    // Layers

    pub fn layers(&self) -> &LayerManager {
        &self.layer_manager
    }

    pub fn layers_control(&self) -> &LayersControl {
        &self.layers_control
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layer_manager.get_layer(layer_id)
    }

    /// A layer is on the map when it is known and visible
    pub fn has_layer(&self, layer_id: &str) -> bool {
        self.layer_manager
            .get_layer(layer_id)
            .is_some_and(|layer| layer.is_visible())
    }

    /// Adds a layer; a visible layer goes straight onto the map
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        let visible = layer.is_visible();
        self.layer_manager.add_layer(layer)?;
        if visible {
            self.announce_added(&layer_id)?;
        }
        Ok(())
    }

    /// Adds a layer and lists it in the layers control under `name`
    pub fn add_overlay(&mut self, layer: Box<dyn LayerTrait>, name: &str) -> Result<()> {
        self.layers_control.add_overlay(layer.id(), name);
        let layer_id = layer.id().to_string();
        if let Err(e) = self.add_layer(layer) {
            self.layers_control.remove_overlay(&layer_id);
            return Err(e);
        }
        Ok(())
    }

    /// Puts a known layer on the map. Returns false when it already was.
    pub fn show_layer(&mut self, layer_id: &str) -> Result<bool> {
        match self.layer_manager.with_layer_mut(layer_id, |layer| {
            let was_visible = layer.is_visible();
            layer.set_visible(true);
            was_visible
        }) {
            None => Err(Error::Layer(format!("unknown layer '{}'", layer_id))),
            Some(true) => Ok(false),
            Some(false) => {
                self.announce_added(layer_id)?;
                Ok(true)
            }
        }
    }

    /// Takes a known layer off the map. Returns false when it was not there.
    pub fn hide_layer(&mut self, layer_id: &str) -> Result<bool> {
        match self.layer_manager.with_layer_mut(layer_id, |layer| {
            let was_visible = layer.is_visible();
            layer.set_visible(false);
            was_visible
        }) {
            None => Err(Error::Layer(format!("unknown layer '{}'", layer_id))),
            Some(false) => Ok(false),
            Some(true) => {
                self.announce_removed(layer_id)?;
                Ok(true)
            }
        }
    }

    /// Flips a layer on or off, as clicking its layers-control checkbox does
    pub fn toggle_layer(&mut self, layer_id: &str) -> Result<bool> {
        if self.has_layer(layer_id) {
            self.hide_layer(layer_id)?;
            Ok(false)
        } else {
            self.show_layer(layer_id)?;
            Ok(true)
        }
    }

    /// Drops a layer entirely, also from the layers control
    pub fn remove_layer(&mut self, layer_id: &str) -> Result<Option<Box<dyn LayerTrait>>> {
        let was_visible = self.has_layer(layer_id);
        if was_visible {
            self.hide_layer(layer_id)?;
        }
        self.layers_control.remove_overlay(layer_id);
        Ok(self.layer_manager.remove_layer(layer_id))
    }

    fn announce_added(&mut self, layer_id: &str) -> Result<()> {
        self.update_zoom_levels()?;
        self.emit(MapEvent::LayerAdd {
            layer_id: layer_id.to_string(),
        });
        if let Some(name) = self.layers_control.overlay_name(layer_id) {
            let name = name.to_string();
            self.emit(MapEvent::OverlayAdd {
                layer_id: layer_id.to_string(),
                name,
            });
        }
        Ok(())
    }

    fn announce_removed(&mut self, layer_id: &str) -> Result<()> {
        self.update_zoom_levels()?;
        self.emit(MapEvent::LayerRemove {
            layer_id: layer_id.to_string(),
        });
        if let Some(name) = self.layers_control.overlay_name(layer_id) {
            let name = name.to_string();
            self.emit(MapEvent::OverlayRemove {
                layer_id: layer_id.to_string(),
                name,
            });
        }
        Ok(())
    }

    // Handlers

    pub fn enable_dragging(&mut self) {
        self.drag.enable();
    }

    pub fn disable_dragging(&mut self) {
        self.drag.disable();
    }

    pub fn dragging_enabled(&self) -> bool {
        self.drag.enabled()
    }

    pub fn enable_box_zoom(&mut self) {
        self.box_zoom_enabled = true;
    }

    pub fn disable_box_zoom(&mut self) {
        self.box_zoom_enabled = false;
        self.box_zoom.cancel();
    }

    pub fn box_zoom_enabled(&self) -> bool {
        self.box_zoom_enabled
    }

    /// Replaces the native shift-drag gesture, dropping any drag in progress
    pub fn set_box_zoom_gesture(&mut self, gesture: BoxZoomGesture) {
        self.box_zoom = gesture;
    }

    pub fn box_zoom_gesture(&self) -> &BoxZoomGesture {
        &self.box_zoom
    }

    pub fn container_classes(&self) -> &ClassList {
        &self.container_classes
    }

    pub fn add_container_class(&mut self, name: &str) {
        self.container_classes.add(name);
    }

    pub fn remove_container_class(&mut self, name: &str) {
        self.container_classes.remove(name);
    }

    // Plugins

    pub fn add_plugin(&mut self, mut plugin: Box<dyn PluginTrait>) -> Result<()> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(Error::Plugin(format!("plugin '{}' already added", name)));
        }
        plugin.on_add(self)?;
        log::debug!("added plugin {} at {}", name, plugin.position().as_str());
        self.plugins.insert(name.clone(), plugin);
        self.plugin_order.push(name);
        Ok(())
    }

    pub fn remove_plugin(&mut self, name: &str) -> Result<Option<Box<dyn PluginTrait>>> {
        let Some(mut plugin) = self.plugins.remove(name) else {
            return Ok(None);
        };
        self.plugin_order.retain(|n| n != name);
        plugin.on_remove(self)?;
        Ok(Some(plugin))
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Plugin downcast to its concrete type
    pub fn plugin<T: 'static>(&self, name: &str) -> Option<&T> {
        self.plugins
            .get(name)
            .and_then(|plugin| plugin.as_any().downcast_ref::<T>())
    }

    /// Runs `f` with a plugin and the map it is attached to.
    ///
    /// The plugin is detached for the call, so the map `f` sees does not list it.
    pub fn with_plugin_mut<T, F, R>(&mut self, name: &str, f: F) -> Option<R>
    where
        T: 'static,
        F: FnOnce(&mut T, &mut Map) -> R,
    {
        let mut plugin = self.plugins.remove(name)?;
        let result = plugin
            .as_any_mut()
            .downcast_mut::<T>()
            .map(|concrete| f(concrete, self));
        self.plugins.insert(name.to_string(), plugin);
        result
    }

    // Events

    /// Registers a listener for a Leaflet-style event name such as `"zoomend"`
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.event_manager.on(event_type, callback);
    }

    pub fn off(&mut self, event_type: &str) {
        self.event_manager.off(event_type);
    }

    pub fn emit(&mut self, event: MapEvent) {
        self.event_manager.emit(event);
    }

    pub fn pending_events(&self) -> usize {
        self.event_manager.pending_events()
    }

    /// Discards queued events without delivering them
    pub fn clear_events(&mut self) {
        self.event_manager.clear_events();
    }

    /// Delivers queued events to listeners and plugins until the queue stays
    /// empty, returning everything delivered in order.
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let mut processed = Vec::new();
        for _ in 0..MAX_EVENT_ROUNDS {
            let batch = self.event_manager.drain();
            if batch.is_empty() {
                return processed;
            }
            for event in batch {
                log::debug!("event {}", event.event_type());
                self.event_manager.notify(&event);
                self.dispatch_to_plugins(&event);
                processed.push(event);
            }
        }
        log::warn!(
            "event queue still busy after {} rounds, {} left queued",
            MAX_EVENT_ROUNDS,
            self.event_manager.pending_events()
        );
        processed
    }

    fn dispatch_to_plugins(&mut self, event: &MapEvent) {
        for name in self.plugin_order.clone() {
            if let Some(mut plugin) = self.plugins.remove(&name) {
                if let Err(e) = plugin.on_map_event(event, self) {
                    log::warn!("plugin {} failed on {}: {}", name, event.event_type(), e);
                }
                self.plugins.insert(name, plugin);
            }
        }
    }

    // Input

    /// Routes pointer input: plugins first, then native box zoom, then dragging
    pub fn handle_input(&mut self, input: &InputEvent) -> Result<EventHandled> {
        if let InputEvent::Resize { size } = input {
            self.resize(*size);
            return Ok(EventHandled::Handled);
        }

        for name in self.plugin_order.clone() {
            if let Some(mut plugin) = self.plugins.remove(&name) {
                let result = plugin.handle_input(input, self);
                self.plugins.insert(name, plugin);
                if result? == EventHandled::Handled {
                    return Ok(EventHandled::Handled);
                }
            }
        }

        if self.box_zoom_enabled {
            if let InputEvent::MouseDown {
                position,
                button: MouseButton::Left,
                modifiers,
            } = input
            {
                if modifiers.shift {
                    self.box_zoom.begin(*position);
                    return Ok(EventHandled::Handled);
                }
            }
        }
        if self.box_zoom.is_active() {
            let mut gesture = std::mem::take(&mut self.box_zoom);
            let handled = self.drive_box_zoom(&mut gesture, input);
            self.box_zoom = gesture;
            return Ok(handled);
        }

        match self.drag.handle(input) {
            DragAction::Pan(delta) => {
                self.viewport.pan(&delta);
                Ok(EventHandled::Handled)
            }
            DragAction::Finished => {
                self.emit(MapEvent::MoveEnd {
                    center: self.viewport.center,
                });
                Ok(EventHandled::Handled)
            }
            DragAction::Ignored => Ok(EventHandled::NotHandled),
        }
    }

    /// Feeds pointer moves and releases to a running box-zoom gesture.
    ///
    /// The first move queues `BoxZoomStart`; a release over a real area fits
    /// the map to it and queues `BoxZoomEnd`.
    pub fn drive_box_zoom(&mut self, gesture: &mut BoxZoomGesture, input: &InputEvent) -> EventHandled {
        if !gesture.is_active() {
            return EventHandled::NotHandled;
        }
        match input {
            InputEvent::MouseMove { position } => {
                if let GestureStep::Started(_) = gesture.move_to(*position) {
                    self.emit(MapEvent::BoxZoomStart);
                }
                EventHandled::Handled
            }
            InputEvent::MouseUp { position } => {
                match gesture.finish(*position, &self.viewport) {
                    GestureStep::Finished(bounds) => match self.fit_bounds(&bounds) {
                        Ok(()) => self.emit(MapEvent::BoxZoomEnd { bounds }),
                        Err(e) => log::warn!("box zoom could not fit bounds: {}", e),
                    },
                    step => log::debug!("box zoom ended without zooming: {:?}", step),
                }
                EventHandled::Handled
            }
            _ => EventHandled::NotHandled,
        }
    }
}
