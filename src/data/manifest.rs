//! The `mapshot.json` manifest written next to a rendered tile pyramid.

use crate::{core::mapper::WorldPoint, Error, Result};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

/// Axis-aligned box in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left_top: WorldPoint,
    pub right_bottom: WorldPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub bounding_box: BoundingBox,
    pub backer_name: String,
}

/// A map tag placed by a force
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub position: WorldPoint,
    pub force_name: String,
    pub text: String,
}

/// Description of one world render. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldManifest {
    /// Pixel size of one tile image at native zoom
    pub render_size: f64,
    /// World units covered by one tile at zoom 0
    pub tile_size: f64,
    pub zoom_min: i32,
    pub zoom_max: i32,
    pub world_min: WorldPoint,
    pub world_max: WorldPoint,
    #[serde(default)]
    pub player: Option<WorldPoint>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub stations: Vec<Station>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub tags: Vec<Tag>,
}

/// Anything other than an array becomes an empty list; a bad array element is an error.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    use serde::de::Error as _;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect(),
        serde_json::Value::Null => Ok(Vec::new()),
        other => {
            log::warn!("expected a list in manifest, got {}; treating it as empty", other);
            Ok(Vec::new())
        }
    }
}

impl WorldManifest {
    /// Parses and validates a manifest body
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: WorldManifest = serde_json::from_str(json)
            .map_err(|e| Error::InvalidManifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.render_size > 0.0) || !self.render_size.is_finite() {
            return Err(Error::InvalidManifest(format!(
                "render_size must be positive, got {}",
                self.render_size
            )));
        }
        if !(self.tile_size > 0.0) || !self.tile_size.is_finite() {
            return Err(Error::InvalidManifest(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        if self.zoom_min > self.zoom_max {
            return Err(Error::InvalidManifest(format!(
                "zoom_min {} is above zoom_max {}",
                self.zoom_min, self.zoom_max
            )));
        }
        if !self.world_min.is_finite() || !self.world_max.is_finite() {
            return Err(Error::InvalidManifest("world corners must be finite".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "render_size": 256,
        "tile_size": 32,
        "zoom_min": 0,
        "zoom_max": 5,
        "world_min": {"x": -100, "y": -50},
        "world_max": {"x": 100, "y": 200},
        "player": {"x": 1.5, "y": 2},
        "stations": [
            {"bounding_box": {"left_top": {"x": 0, "y": 0}, "right_bottom": {"x": 10, "y": 4}}, "backer_name": "Iron Mine"}
        ],
        "tags": [{"position": {"x": 3, "y": 4}, "force_name": "player", "text": "base"}],
        "unknown": true
    }"#;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = WorldManifest::from_json(MANIFEST).unwrap();
        assert_eq!(manifest.render_size, 256.0);
        assert_eq!(manifest.zoom_max, 5);
        assert_eq!(manifest.player, Some(WorldPoint::new(1.5, 2.0)));
        assert_eq!(manifest.stations[0].backer_name, "Iron Mine");
        assert_eq!(manifest.tags[0].force_name, "player");
    }

    #[test]
    fn test_optional_collections_degrade_to_empty() {
        let manifest = WorldManifest::from_json(
            r#"{"render_size": 256, "tile_size": 256, "zoom_min": 0, "zoom_max": 2,
                "world_min": {"x": 0, "y": 0}, "world_max": {"x": 1, "y": 1},
                "stations": null, "tags": {"not": "a list"}}"#,
        )
        .unwrap();
        assert!(manifest.stations.is_empty());
        assert!(manifest.tags.is_empty());
        assert!(manifest.player.is_none());
    }

    #[test]
    fn test_malformed_entries_are_rejected() {
        let err = WorldManifest::from_json(
            r#"{"render_size": 256, "tile_size": 256, "zoom_min": 0, "zoom_max": 2,
                "world_min": {"x": 0, "y": 0}, "world_max": {"x": 1, "y": 1},
                "tags": [{"position": {"x": 0}}]}"#,
        );
        assert!(matches!(err, Err(Error::InvalidManifest(_))));
    }

    #[test]
    fn test_validation_rules() {
        let mut manifest = WorldManifest::from_json(MANIFEST).unwrap();
        manifest.tile_size = 0.0;
        assert!(manifest.validate().is_err());

        let mut manifest = WorldManifest::from_json(MANIFEST).unwrap();
        manifest.zoom_min = 6;
        assert!(manifest.validate().is_err());

        assert!(WorldManifest::from_json("{}").is_err());
    }
}
