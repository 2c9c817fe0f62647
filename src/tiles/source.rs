use crate::{constants::TILE_URL_TEMPLATE, core::geo::TileCoord};

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;
}

/// Tiles laid out by the mapshot renderer: `<path>zoom_{z}/tile_{x}_{y}.jpg`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapshotTileSource {
    base_path: String,
    template: String,
}

impl MapshotTileSource {
    /// `base_path` is used verbatim, so it should already end with `/` when non-empty
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            template: TILE_URL_TEMPLATE.to_string(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Full URL template, as a Leaflet tile layer would receive it
    pub fn template(&self) -> String {
        format!("{}{}", self.base_path, self.template)
    }
}

impl TileSource for MapshotTileSource {
    fn url(&self, coord: TileCoord) -> String {
        let relative = self
            .template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string());
        format!("{}{}", self.base_path, relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_uses_base_path() {
        let source = MapshotTileSource::new("out/");
        assert_eq!(source.url(TileCoord::new(3, -2, 5)), "out/zoom_5/tile_3_-2.jpg");
        assert_eq!(source.template(), "out/zoom_{z}/tile_{x}_{y}.jpg");
    }

    #[test]
    fn test_empty_base_path_is_page_relative() {
        let source = MapshotTileSource::new("");
        assert_eq!(source.url(TileCoord::new(0, 0, 0)), "zoom_0/tile_0_0.jpg");
    }
}
