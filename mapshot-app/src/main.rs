use anyhow::Context;
use mapshot_viewer::{
    constants::PARAM_PATH,
    data::loader::{resolve_path, FileSource, HttpSource, ManifestSource},
    layers::LayerTrait,
    MemoryStore, Viewer, ViewerConfig,
};
use std::sync::Arc;

/// Loads a mapshot render the way the page does and prints the resulting view.
///
/// Usage: `mapshot-app [QUERY]`, for example `mapshot-app "?path=out/&x=10&z=3"`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mapshot_viewer::init_logging();

    let query = std::env::args().nth(1).unwrap_or_default();
    let config = match std::env::var("MAPSHOT_CONFIG") {
        Ok(file) => ViewerConfig::from_file(&file).with_context(|| format!("reading config {}", file))?,
        Err(_) => ViewerConfig::default(),
    };

    let store = MemoryStore::from_query(&query);
    let path = resolve_path(store.current().get(PARAM_PATH), &config.default_path);
    let source: Arc<dyn ManifestSource> = if path.starts_with("http://") || path.starts_with("https://") {
        Arc::new(HttpSource::new())
    } else {
        Arc::new(FileSource::new("."))
    };

    let viewer = match Viewer::load(&config, source, store).await {
        Ok(viewer) => viewer,
        Err(e) => {
            log::error!("viewer failed to start: {}", e);
            return Err(e).context("loading mapshot");
        }
    };

    let map = viewer.map();
    let state = viewer.view_state();
    println!("path:    {:?}", viewer.path());
    println!(
        "view:    world ({}, {}) at zoom {} (allowed {}..={})",
        state.center.x,
        state.center.y,
        state.zoom,
        map.min_zoom(),
        map.max_zoom()
    );
    for entry in map.layers_control().overlays() {
        let markers = map
            .get_layer(&entry.layer_id)
            .and_then(|layer| layer.as_any().downcast_ref::<mapshot_viewer::LayerGroup>())
            .map_or(0, |group| group.len());
        let shown = if map.has_layer(&entry.layer_id) { "on" } else { "off" };
        println!("overlay: {:<16} {:>3} {:>5} markers", entry.name, shown, markers);
    }
    if let Some(layer) = map.get_layer(mapshot_viewer::layers::BASE_LAYER_ID) {
        if let Some(tiles) = layer.as_any().downcast_ref::<mapshot_viewer::TileLayer>() {
            println!("tiles:   {} in view", tiles.tiles_in_view(map.viewport()).len());
        }
    }
    Ok(())
}
