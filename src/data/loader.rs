//! Fetching the world manifest.
//!
//! A [`ManifestSource`] turns a URL into a response body. The viewer issues a
//! single fetch of `<path>mapshot.json` at startup and never retries.

use crate::{
    constants::MANIFEST_FILE,
    data::manifest::WorldManifest,
    prelude::{Arc, HashMap},
    Error, Result,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::{path::PathBuf, sync::Mutex};

/// Shared async HTTP client for manifest requests
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    let builder = reqwest::Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder
        .user_agent(concat!("mapshot-viewer/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30));
    builder.build().unwrap_or_else(|e| {
        log::warn!("falling back to default HTTP client: {}", e);
        reqwest::Client::new()
    })
});

/// Where manifest bodies come from
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ManifestSource: Send + Sync {
    /// Returns the body stored at `url`
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP GET through the shared client.
///
/// Relative URLs are joined onto `base`, the way a page resolves them against
/// its own location. Without a base only absolute URLs can be fetched.
#[derive(Debug, Default, Clone)]
pub struct HttpSource {
    base: Option<reqwest::Url>,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative requests against `base`, usually the page's `location.href`
    pub fn with_base(base: &str) -> Result<Self> {
        let base = reqwest::Url::parse(base)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", base, e)))?;
        Ok(Self { base: Some(base) })
    }

    /// The absolute URL a request for `url` goes to
    pub fn request_url(&self, url: &str) -> Result<reqwest::Url> {
        let joined = match &self.base {
            Some(base) => base.join(url),
            None => reqwest::Url::parse(url),
        };
        joined.map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ManifestSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let target = self.request_url(url)?;
        log::debug!("GET {}", target);
        let response = HTTP_CLIENT.get(target.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: target.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Reads manifests from the local filesystem, relative to `root`
#[derive(Debug, Default, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ManifestSource for FileSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let path = self.root.join(url);
        log::debug!("read {}", path.display());

        #[cfg(feature = "tokio-runtime")]
        let body = tokio::fs::read_to_string(&path).await?;

        #[cfg(not(feature = "tokio-runtime"))]
        let body = std::fs::read_to_string(&path)?;

        Ok(body)
    }
}

/// In-memory bodies keyed by URL; records every request
#[derive(Debug, Default)]
pub struct MemorySource {
    bodies: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ManifestSource for MemorySource {
    async fn fetch(&self, url: &str) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.bodies.get(url).cloned().ok_or_else(|| Error::HttpStatus {
            status: 404,
            url: url.to_string(),
        })
    }
}

/// Picks the manifest base path: the query value if present, else `default`.
///
/// A non-empty path always ends with `/`; an empty one stays page-relative.
pub fn resolve_path(query_path: Option<&str>, default: &str) -> String {
    let mut path = query_path.unwrap_or(default).to_string();
    if !path.is_empty() && !path.ends_with('/') {
        path.push('/');
    }
    path
}

/// Fetches and validates manifests through a [`ManifestSource`]
#[derive(Clone)]
pub struct ManifestLoader {
    source: Arc<dyn ManifestSource>,
}

impl ManifestLoader {
    pub fn new(source: Arc<dyn ManifestSource>) -> Self {
        Self { source }
    }

    /// URL of the manifest under `path`
    pub fn manifest_url(path: &str) -> String {
        format!("{}{}", path, MANIFEST_FILE)
    }

    /// Loads `<path>mapshot.json`
    pub async fn load(&self, path: &str) -> Result<WorldManifest> {
        let url = Self::manifest_url(path);
        let body = self.source.fetch(&url).await?;
        let manifest = WorldManifest::from_json(&body)?;
        log::info!(
            "loaded {}: zoom {}..={}, {} stations, {} tags",
            url,
            manifest.zoom_min,
            manifest.zoom_max,
            manifest.stations.len(),
            manifest.tags.len()
        );
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"render_size": 256, "tile_size": 256, "zoom_min": 0, "zoom_max": 3,
        "world_min": {"x": 0, "y": 0}, "world_max": {"x": 100, "y": 200}}"#;

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path(Some("out"), "default/"), "out/");
        assert_eq!(resolve_path(Some("out/"), ""), "out/");
        assert_eq!(resolve_path(None, "default"), "default/");
        assert_eq!(resolve_path(None, ""), "");
        assert_eq!(resolve_path(Some(""), "default/"), "");
    }

    #[test]
    fn test_http_source_joins_page_relative_paths() {
        let source = HttpSource::with_base("https://host.example/maps/viewer.html?path=out").unwrap();
        let url = source.request_url(&ManifestLoader::manifest_url(&resolve_path(Some("out"), ""))).unwrap();
        assert_eq!(url.as_str(), "https://host.example/maps/out/mapshot.json");

        let url = source.request_url(&ManifestLoader::manifest_url("")).unwrap();
        assert_eq!(url.as_str(), "https://host.example/maps/mapshot.json");

        let url = source.request_url("https://cdn.example/a/mapshot.json").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example/a/mapshot.json");
    }

    #[tokio::test]
    async fn test_http_source_without_base_rejects_relative_urls() {
        let err = HttpSource::new().fetch("out/mapshot.json").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)), "{}", err);
        assert!(matches!(HttpSource::with_base("not a url"), Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_load_fetches_manifest_once() {
        let source = Arc::new(MemorySource::new().with_body("maps/mapshot.json", BODY));
        let loader = ManifestLoader::new(source.clone());
        let manifest = loader.load("maps/").await.unwrap();
        assert_eq!(manifest.world_max.y, 200.0);
        assert_eq!(source.requests(), vec!["maps/mapshot.json"]);
    }

    #[tokio::test]
    async fn test_missing_manifest_is_an_error() {
        let loader = ManifestLoader::new(Arc::new(MemorySource::new()));
        let err = loader.load("").await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_invalid_body_is_an_error() {
        let source = MemorySource::new().with_body("mapshot.json", "<html>oops</html>");
        let loader = ManifestLoader::new(Arc::new(source));
        assert!(matches!(
            loader.load("").await,
            Err(Error::InvalidManifest(_))
        ));
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_file_source_reads_relative_to_root() {
        let dir = std::env::temp_dir().join(format!("mapshot-viewer-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("mapshot.json"), BODY).unwrap();

        let loader = ManifestLoader::new(Arc::new(FileSource::new(&dir)));
        let manifest = loader.load("").await.unwrap();
        assert_eq!(manifest.zoom_max, 3);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
