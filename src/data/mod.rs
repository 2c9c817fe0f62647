pub mod loader;
pub mod manifest;

pub use loader::{resolve_path, FileSource, HttpSource, ManifestLoader, ManifestSource, MemorySource};
pub use manifest::{BoundingBox, Station, Tag, WorldManifest};
