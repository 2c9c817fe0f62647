//! Configuration for the viewer
//!
//! `ViewerConfig` plays the role of the page's global configuration object:
//! it supplies the default manifest path (baked in at build time) and the
//! tunables the viewer hands to the map and its controls. Every field has a
//! default, so a JSON config only needs the keys it wants to override.

use crate::{
    constants::{DEFAULT_ZOOM_DELTA, DEFAULT_ZOOM_SNAP, ZOOM_PADDING},
    core::geo::Point,
    plugins::{box_zoom::BoxZoomOptions, zoom_slider::ZoomSliderOptions},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Build-time default for the manifest path
pub const BUILD_DEFAULT_PATH: &str = match option_env!("MAPSHOT_DEFAULT_PATH") {
    Some(path) => path,
    None => "",
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Manifest path used when the URL carries no `path` parameter
    pub default_path: String,
    /// Zoom levels snap to multiples of this value
    pub zoom_snap: f64,
    /// Step used by zoom in/out
    pub zoom_delta: f64,
    /// Interpolated zoom levels allowed beyond each end of the native range
    pub zoom_padding: i32,
    /// Overlay keys that start on the map before URL state is applied
    pub visible_overlays: Vec<String>,
    /// Map container size in pixels
    pub container_size: Point,
    pub box_zoom: BoxZoomOptions,
    pub zoom_slider: ZoomSliderOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_path: BUILD_DEFAULT_PATH.to_string(),
            zoom_snap: DEFAULT_ZOOM_SNAP,
            zoom_delta: DEFAULT_ZOOM_DELTA,
            zoom_padding: ZOOM_PADDING,
            visible_overlays: Vec::new(),
            container_size: Point::new(800.0, 600.0),
            box_zoom: BoxZoomOptions::default(),
            zoom_slider: ZoomSliderOptions::default(),
        }
    }
}

impl ViewerConfig {
    /// Parses a JSON config, filling missing keys with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ViewerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.zoom_snap >= 0.0) {
            return Err(Error::Config(format!("zoom_snap must be >= 0, got {}", self.zoom_snap)));
        }
        if !(self.zoom_delta > 0.0) {
            return Err(Error::Config(format!("zoom_delta must be > 0, got {}", self.zoom_delta)));
        }
        if self.zoom_padding < 0 {
            return Err(Error::Config(format!(
                "zoom_padding must be >= 0, got {}",
                self.zoom_padding
            )));
        }
        if let Some(ratio) = self.box_zoom.aspect_ratio {
            if !(ratio > 0.0) {
                return Err(Error::Config(format!("aspect_ratio must be > 0, got {}", ratio)));
            }
        }
        if !(self.zoom_slider.step_height > 0.0) {
            return Err(Error::Config(format!(
                "zoom_slider.step_height must be > 0, got {}",
                self.zoom_slider.step_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.zoom_snap, 0.1);
        assert_eq!(config.zoom_delta, 1.0);
        assert_eq!(config.zoom_padding, 4);
        assert!(config.visible_overlays.is_empty());
        assert!(!config.box_zoom.keep_on);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ViewerConfig::from_json(
            r#"{"default_path": "out/", "box_zoom": {"aspect_ratio": 2.0, "keep_on": true}}"#,
        )
        .unwrap();
        assert_eq!(config.default_path, "out/");
        assert_eq!(config.box_zoom.aspect_ratio, Some(2.0));
        assert!(config.box_zoom.keep_on);
        assert_eq!(config.zoom_slider.step_height, 8.0);
        assert_eq!(config.zoom_snap, 0.1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ViewerConfig::from_json(r#"{"zoom_delta": 0}"#).is_err());
        assert!(ViewerConfig::from_json(r#"{"box_zoom": {"aspect_ratio": -1}}"#).is_err());
        assert!(ViewerConfig::from_json(r#"{"zoom_slider": {"step_height": 0}}"#).is_err());
        assert!(ViewerConfig::from_json("not json").is_err());
    }
}
