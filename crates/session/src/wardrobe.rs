//! Garment collection loaded once at startup.

use std::path::{Path, PathBuf};

use fitroom_common::config::WardrobeConfig;
use fitroom_common::error::{FitroomError, FitroomResult};
use fitroom_compositor::ClothingImage;

/// One selectable garment.
#[derive(Debug, Clone)]
pub struct WardrobeItem {
    /// Display name (file stem).
    pub name: String,

    /// Where the garment was loaded from, if it came from disk.
    pub path: Option<PathBuf>,

    pub image: ClothingImage,
}

/// A file that was skipped during loading.
#[derive(Debug, Clone)]
pub struct RejectedAsset {
    pub path: PathBuf,
    pub reason: String,
}

/// Immutable, ordered collection of garments.
#[derive(Debug, Clone, Default)]
pub struct Wardrobe {
    dir: Option<PathBuf>,
    items: Vec<WardrobeItem>,
    rejected: Vec<RejectedAsset>,
}

impl Wardrobe {
    /// Build a wardrobe from in-memory garments, keeping their order.
    pub fn from_items(items: impl IntoIterator<Item = (String, ClothingImage)>) -> Self {
        Self {
            dir: None,
            items: items
                .into_iter()
                .map(|(name, image)| WardrobeItem {
                    name,
                    path: None,
                    image,
                })
                .collect(),
            rejected: Vec::new(),
        }
    }

    /// Load every matching image in `config.dir`, sorted by file name.
    ///
    /// Files that fail to decode, lack an alpha channel, or have a zero
    /// dimension are skipped and listed in [`Wardrobe::rejected`]. A missing
    /// directory is an error; an empty result is not (callers decide).
    pub fn load(config: &WardrobeConfig) -> FitroomResult<Self> {
        let dir = &config.dir;
        if !dir.is_dir() {
            return Err(FitroomError::FileNotFound { path: dir.clone() });
        }

        let mut wardrobe = Self {
            dir: Some(dir.clone()),
            ..Self::default()
        };
        for path in list_candidates(dir, &config.extensions)? {
            match load_item(&path) {
                Ok(item) => {
                    tracing::debug!(
                        name = %item.name,
                        width = item.image.width(),
                        height = item.image.height(),
                        "Loaded garment"
                    );
                    wardrobe.items.push(item);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Skipping garment");
                    wardrobe.rejected.push(RejectedAsset {
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            dir = %dir.display(),
            loaded = wardrobe.items.len(),
            rejected = wardrobe.rejected.len(),
            "Wardrobe loaded"
        );
        Ok(wardrobe)
    }

    /// Directory the wardrobe was loaded from.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WardrobeItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[WardrobeItem] {
        &self.items
    }

    pub fn rejected(&self) -> &[RejectedAsset] {
        &self.rejected
    }
}

/// Regular files in `dir` with an accepted extension, sorted by file name.
fn list_candidates(dir: &Path, extensions: &[String]) -> FitroomResult<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| {
                    extensions
                        .iter()
                        .any(|allowed| allowed.eq_ignore_ascii_case(ext))
                })
                .unwrap_or(false)
        })
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

fn load_item(path: &Path) -> FitroomResult<WardrobeItem> {
    let decoded = image::open(path)
        .map_err(|e| FitroomError::malformed_asset(path, format!("decode failed: {e}")))?;
    let image = ClothingImage::from_dynamic(decoded)
        .map_err(|defect| FitroomError::malformed_asset(path, defect.to_string()))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(WardrobeItem {
        name,
        path: Some(path.to_path_buf()),
        image,
    })
}
