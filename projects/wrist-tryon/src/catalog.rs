//! Overlay asset catalog: named RGBA item images loaded from a directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::pipeline::types::OverlayAsset;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no catalog item named '{0}'")]
    ItemNotFound(String),
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode overlay asset '{name}': {reason}")]
    AssetDecode { name: String, reason: String },
}

/// One selectable item, keyed by file stem.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// All PNG assets under the catalog root, sorted by name. Listing does
    /// not decode the files.
    pub fn list(&self) -> Vec<CatalogEntry> {
        let mut entries: Vec<CatalogEntry> =
            self.scan().into_iter().map(|(entry, _)| entry).collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Path of the named item's file, if it exists in the catalog.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.scan()
            .into_iter()
            .find(|(entry, _)| entry.name == name)
            .map(|(_, path)| path)
    }

    fn scan(&self) -> Vec<(CatalogEntry, PathBuf)> {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_lowercase() == "png")
                    .unwrap_or(false)
            })
            .filter_map(|e| {
                let stem = e.path().file_stem()?.to_str()?.to_string();
                let file_name = e.file_name().to_str()?.to_string();
                Some((
                    CatalogEntry {
                        name: stem,
                        file_name,
                    },
                    e.path().to_path_buf(),
                ))
            })
            .collect()
    }

    /// Load and decode the named item to a 4-channel asset.
    pub fn load(&self, name: &str) -> Result<OverlayAsset, CatalogError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| CatalogError::ItemNotFound(name.to_string()))?;
        let bytes = fs::read(&path)?;
        let decoded =
            image::load_from_memory(&bytes).map_err(|e| CatalogError::AssetDecode {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(OverlayAsset {
            name: name.to_string(),
            image: decoded.to_rgba8(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn scratch_catalog(tag: &str) -> Catalog {
        let root = std::env::temp_dir().join(format!("wrist-tryon-catalog-{tag}"));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        Catalog::new(root)
    }

    fn write_png(catalog: &Catalog, name: &str) {
        RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]))
            .save(catalog.root().join(format!("{name}.png")))
            .unwrap();
    }

    #[test]
    fn test_lists_png_assets_sorted() {
        let catalog = scratch_catalog("list");
        write_png(&catalog, "silver-band");
        write_png(&catalog, "gold-cuff");
        fs::write(catalog.root().join("notes.txt"), "not an asset").unwrap();

        let names: Vec<String> = catalog.list().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["gold-cuff", "silver-band"]);
    }

    #[test]
    fn test_loads_a_named_asset_as_rgba() {
        let catalog = scratch_catalog("load");
        write_png(&catalog, "gold-cuff");

        let asset = catalog.load("gold-cuff").unwrap();
        assert_eq!(asset.name, "gold-cuff");
        assert_eq!((asset.image.width(), asset.image.height()), (4, 4));
        assert_eq!(asset.image.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_unknown_item_is_reported() {
        let catalog = scratch_catalog("missing");
        let err = catalog.load("no-such-item").unwrap_err();
        assert!(matches!(err, CatalogError::ItemNotFound(name) if name == "no-such-item"));
    }

    #[test]
    fn test_undecodable_asset_is_reported() {
        let catalog = scratch_catalog("bad");
        fs::write(catalog.root().join("broken.png"), b"not a png").unwrap();

        let err = catalog.load("broken").unwrap_err();
        assert!(matches!(err, CatalogError::AssetDecode { .. }));
    }
}
