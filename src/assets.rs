//! Filesystem-backed picture loading: scan a pictures folder once at
//! startup, decode on demand, cache by name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::RgbaImage;

use crate::host::{ImageAsset, PictureLoader};

// ── Picture ──────────────────────────────────────────────────────────────────

/// A decoded picture. A failed decode keeps the handle alive but never
/// ready, which leaves any slot waiting on it in its loading state — the
/// same "nothing happens" degradation as every other failure path.
pub struct Picture {
    pixels: Option<RgbaImage>,
}

impl Picture {
    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }
}

impl ImageAsset for Picture {
    fn is_ready(&self) -> bool {
        self.pixels.is_some()
    }

    fn width(&self) -> u32 {
        self.pixels.as_ref().map_or(0, RgbaImage::width)
    }

    fn height(&self) -> u32 {
        self.pixels.as_ref().map_or(0, RgbaImage::height)
    }
}

// ── FolderPictures ───────────────────────────────────────────────────────────

/// Name → file index over a pictures directory, with a decode cache.
pub struct FolderPictures {
    by_name: HashMap<String, PathBuf>,
    cache: HashMap<String, Rc<Picture>>,
}

impl FolderPictures {
    /// Scan `path` recursively for `.png` files, keyed by file stem.
    /// Duplicate stems are skipped with a warning; only the first file with
    /// a given name is used.
    pub fn scan(path: impl AsRef<Path>) -> Self {
        let mut by_name: HashMap<String, PathBuf> = HashMap::new();

        for entry in walkdir::WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let file_path = entry.path();
            if file_path.extension().and_then(|s| s.to_str()) != Some("png") {
                continue;
            }
            let name = match file_path.file_stem().and_then(|s| s.to_str()) {
                Some(n) if !n.is_empty() => n.to_string(),
                _ => continue,
            };
            if by_name.contains_key(&name) {
                log::warn!("pictures: duplicate name '{}' from {:?}; skipping", name, file_path);
                continue;
            }
            by_name.insert(name, file_path.to_path_buf());
        }

        Self { by_name, cache: HashMap::new() }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl PictureLoader for FolderPictures {
    fn load_picture(&mut self, name: &str) -> Rc<dyn ImageAsset> {
        if let Some(cached) = self.cache.get(name) {
            return Rc::clone(cached) as Rc<dyn ImageAsset>;
        }

        let pixels = match self.by_name.get(name) {
            Some(path) => match image::open(path) {
                Ok(img) => Some(img.to_rgba8()),
                Err(e) => {
                    log::warn!("pictures: failed to decode {:?}: {e}", path);
                    None
                }
            },
            None => {
                log::warn!("pictures: unknown picture '{name}'");
                None
            }
        };

        let picture = Rc::new(Picture { pixels });
        self.cache.insert(name.to_string(), Rc::clone(&picture));
        picture
    }
}
