//! Browser bindings: the page URL as the parameter store, a console logger
//! and exported entry points the page shell drives the viewer through.

use crate::{
    core::{config::ViewerConfig, geo::Point},
    data::loader::HttpSource,
    input::events::{InputEvent, KeyModifiers},
    runtime,
    state::{query::QueryParams, store::ParamStore},
    viewer::Viewer,
    Error, Result,
};
use std::{cell::RefCell, sync::Arc};
use wasm_bindgen::prelude::*;

thread_local! {
    static VIEWER: RefCell<Option<Viewer<BrowserStore>>> = RefCell::new(None);
}

fn js_error(context: &str, value: JsValue) -> Error {
    Error::Store(format!("{}: {:?}", context, value))
}

fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or_else(|| Error::Store("no window".to_string()))
}

/// `location.search`, rewritten through `history.replaceState`
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStore;

impl ParamStore for BrowserStore {
    fn read(&self) -> Result<QueryParams> {
        let search = window()?
            .location()
            .search()
            .map_err(|e| js_error("location.search", e))?;
        Ok(QueryParams::parse(&search))
    }

    fn replace(&mut self, params: &QueryParams) -> Result<()> {
        let url = format!("?{}", params);
        window()?
            .history()
            .map_err(|e| js_error("history", e))?
            .replace_state_with_url(&JsValue::NULL, "", Some(&url))
            .map_err(|e| js_error("history.replaceState", e))
    }
}

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            log::Level::Info => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn container_size(window: &web_sys::Window) -> Option<Point> {
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some(Point::new(width, height))
}

/// Manifest requests resolve against the page, like a relative `fetch`
fn page_source() -> Result<HttpSource> {
    let href = window()?
        .location()
        .href()
        .map_err(|e| js_error("location.href", e))?;
    HttpSource::with_base(&href)
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }

    let mut config = ViewerConfig::default();
    if let Some(size) = web_sys::window().as_ref().and_then(container_size) {
        config.container_size = size;
    }
    let source = match page_source() {
        Ok(source) => source,
        Err(e) => {
            log::error!("viewer failed to start: {}", e);
            return;
        }
    };

    runtime::spawn(async move {
        match Viewer::load(&config, Arc::new(source), BrowserStore).await {
            Ok(viewer) => VIEWER.with(|slot| *slot.borrow_mut() = Some(viewer)),
            Err(e) => log::error!("viewer failed to start: {}", e),
        }
    });
}

fn with_viewer<R>(f: impl FnOnce(&mut Viewer<BrowserStore>) -> Result<R>) -> std::result::Result<R, JsValue> {
    VIEWER.with(|slot| {
        let mut slot = slot.borrow_mut();
        let viewer = slot
            .as_mut()
            .ok_or_else(|| JsValue::from_str("viewer not loaded"))?;
        f(viewer).map_err(|e| JsValue::from_str(&e.to_string()))
    })
}

fn modifiers(shift: bool) -> KeyModifiers {
    KeyModifiers {
        shift,
        ..Default::default()
    }
}

#[wasm_bindgen]
pub fn pointer_down(x: f64, y: f64, shift: bool) -> std::result::Result<(), JsValue> {
    let input = InputEvent::primary_down(Point::new(x, y), modifiers(shift));
    with_viewer(|viewer| viewer.handle_input(&input).map(|_| ()))
}

#[wasm_bindgen]
pub fn pointer_move(x: f64, y: f64) -> std::result::Result<(), JsValue> {
    let input = InputEvent::MouseMove {
        position: Point::new(x, y),
    };
    with_viewer(|viewer| viewer.handle_input(&input).map(|_| ()))
}

#[wasm_bindgen]
pub fn pointer_up(x: f64, y: f64) -> std::result::Result<(), JsValue> {
    let input = InputEvent::MouseUp {
        position: Point::new(x, y),
    };
    with_viewer(|viewer| viewer.handle_input(&input).map(|_| ()))
}

#[wasm_bindgen]
pub fn resize(width: f64, height: f64) -> std::result::Result<(), JsValue> {
    let input = InputEvent::Resize {
        size: Point::new(width, height),
    };
    with_viewer(|viewer| viewer.handle_input(&input).map(|_| ()))
}

#[wasm_bindgen]
pub fn toggle_overlay(key: &str) -> std::result::Result<bool, JsValue> {
    with_viewer(|viewer| viewer.toggle_overlay(key))
}

#[wasm_bindgen]
pub fn toggle_box_zoom() -> std::result::Result<(), JsValue> {
    with_viewer(|viewer| viewer.toggle_box_zoom())
}

#[wasm_bindgen]
pub fn zoom_in(shift: bool) -> std::result::Result<(), JsValue> {
    with_viewer(|viewer| viewer.zoom_in(shift))
}

#[wasm_bindgen]
pub fn zoom_out(shift: bool) -> std::result::Result<(), JsValue> {
    with_viewer(|viewer| viewer.zoom_out(shift))
}

/// Click on the slider track, `y` pixels from its top
#[wasm_bindgen]
pub fn slider_click(y: f64) -> std::result::Result<(), JsValue> {
    with_viewer(|viewer| viewer.click_slider_track(y))
}

#[wasm_bindgen]
pub fn knob_down(y: f64) -> std::result::Result<(), JsValue> {
    with_viewer(|viewer| viewer.start_knob_drag(y))
}

#[wasm_bindgen]
pub fn knob_move(y: f64) -> std::result::Result<(), JsValue> {
    with_viewer(|viewer| viewer.drag_knob(y))
}

#[wasm_bindgen]
pub fn knob_up() -> std::result::Result<(), JsValue> {
    with_viewer(|viewer| viewer.end_knob_drag())
}

/// Current camera, tiles, overlays and controls as a plain JS object
#[wasm_bindgen]
pub fn snapshot() -> std::result::Result<JsValue, JsValue> {
    let json = with_viewer(|viewer| Ok(serde_json::to_string(&viewer.snapshot())?))?;
    js_sys::JSON::parse(&json)
}
