use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use image::RgbaImage;

use crate::error::{RoomVibeError, RoomVibeResult};

/// Resolves catalog image references into decoded pixels. The only place the
/// engine touches IO; everything downstream consumes prepared images.
pub trait ImageStore {
    fn load(&mut self, source: &str) -> RoomVibeResult<Arc<RgbaImage>>;
}

/// Loads images from a root directory and memoizes decoded results.
pub struct FsImageStore {
    root: PathBuf,
    cache: HashMap<String, Arc<RgbaImage>>,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }
}

impl ImageStore for FsImageStore {
    fn load(&mut self, source: &str) -> RoomVibeResult<Arc<RgbaImage>> {
        if let Some(img) = self.cache.get(source) {
            return Ok(Arc::clone(img));
        }

        let rel = validate_source(source)?;
        let path = self.root.join(rel);
        let bytes = std::fs::read(&path)
            .map_err(|e| RoomVibeError::asset_load(format!("read '{}': {e}", path.display())))?;
        let img = Arc::new(decode_image(&bytes)?);
        self.cache.insert(source.to_string(), Arc::clone(&img));
        Ok(img)
    }
}

pub fn decode_image(bytes: &[u8]) -> RoomVibeResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| RoomVibeError::asset_load(format!("{e:#}")))?;
    Ok(dyn_img.to_rgba8())
}

/// Source references must be relative, use `/` separators, and contain no
/// `..` components. Checked at load time, not catalog validation, because
/// references may point at host-managed storage the engine never sees.
fn validate_source(source: &str) -> RoomVibeResult<&Path> {
    let normalized = source.trim();
    if normalized.is_empty() {
        return Err(RoomVibeError::asset_load("empty image source"));
    }
    if normalized.starts_with('/') || normalized.contains('\\') {
        return Err(RoomVibeError::asset_load(format!(
            "image source '{source}' must be a relative '/' separated path"
        )));
    }
    let path = Path::new(normalized);
    if path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(RoomVibeError::asset_load(format!(
            "image source '{source}' must not contain '..'"
        )));
    }
    Ok(path)
}

/// Settle signal for an in-flight image load. The room transition only cares
/// that the load finished, not whether it succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
}
