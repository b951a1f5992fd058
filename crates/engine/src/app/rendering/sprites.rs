use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::debug;

use crate::app::SpriteCatalog;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start with '/'")]
    LeadingSlash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

#[derive(Debug, Error)]
pub(crate) enum SpriteLoadError {
    #[error("invalid sprite key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: SpriteKeyError,
    },
    #[error("failed to open sprite {path}: {source}")]
    Open {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode sprite {path}: {source}")]
    Decode {
        key: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl SpriteLoadError {
    pub(crate) fn key(&self) -> &str {
        match self {
            Self::InvalidKey { key, .. } | Self::Open { key, .. } | Self::Decode { key, .. } => key,
        }
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        match self {
            Self::InvalidKey { .. } => None,
            Self::Open { path, .. } | Self::Decode { path, .. } => Some(path),
        }
    }
}

pub(crate) fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::LeadingSlash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')))
    {
        Some(character) => Err(SpriteKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LoadedSprite {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

impl LoadedSprite {
    pub(crate) fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width.saturating_sub(1)) as usize;
        let y = y.min(self.height.saturating_sub(1)) as usize;
        let offset = (y * self.width as usize + x) * 4;
        match self.rgba.get(offset..offset + 4) {
            Some(px) => [px[0], px[1], px[2], px[3]],
            None => [0, 0, 0, 0],
        }
    }
}

/// Decoded sprites, loaded eagerly at startup so a missing image fails before the first frame.
#[derive(Debug, Default)]
pub(crate) struct SpriteStore {
    sprites: HashMap<String, LoadedSprite>,
}

impl SpriteStore {
    pub(crate) fn load_all(sprites_dir: &Path, keys: &[&str]) -> Result<Self, SpriteLoadError> {
        let mut sprites = HashMap::with_capacity(keys.len());
        for key in keys {
            let path = sprite_path(sprites_dir, key)?;
            let sprite = load_sprite_rgba(key, &path)?;
            debug!(
                sprite_key = key,
                width = sprite.width,
                height = sprite.height,
                "sprite_loaded"
            );
            sprites.insert((*key).to_string(), sprite);
        }
        Ok(Self { sprites })
    }

    pub(crate) fn get(&self, key: &str) -> Option<&LoadedSprite> {
        self.sprites.get(key)
    }

    pub(crate) fn catalog(&self) -> SpriteCatalog {
        let mut catalog = SpriteCatalog::default();
        for (key, sprite) in &self.sprites {
            catalog.insert(key.clone(), (sprite.width, sprite.height));
        }
        catalog
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, key: &str, sprite: LoadedSprite) {
        self.sprites.insert(key.to_string(), sprite);
    }
}

fn sprite_path(sprites_dir: &Path, key: &str) -> Result<PathBuf, SpriteLoadError> {
    validate_sprite_key(key).map_err(|source| SpriteLoadError::InvalidKey {
        key: key.to_string(),
        source,
    })?;
    Ok(sprites_dir.join(format!("{key}.png")))
}

fn load_sprite_rgba(key: &str, path: &Path) -> Result<LoadedSprite, SpriteLoadError> {
    let reader = ImageReader::open(path).map_err(|source| SpriteLoadError::Open {
        key: key.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| SpriteLoadError::Decode {
        key: key.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn accepts_valid_keys() {
        for key in ["player", "item_rock0", "items/pine-wood"] {
            assert!(validate_sprite_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/rock0", "..", "a/../b", "Rock0", "rock.png", r"a\b"] {
            assert!(validate_sprite_key(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn load_all_decodes_png_and_reports_catalog_sizes() {
        let dir = TempDir::new().expect("tempdir");
        RgbaImage::from_pixel(6, 9, Rgba([10, 20, 30, 255]))
            .save(dir.path().join("player.png"))
            .expect("write png");

        let store = SpriteStore::load_all(dir.path(), &["player"]).expect("load");
        let sprite = store.get("player").expect("sprite");
        assert_eq!((sprite.width, sprite.height), (6, 9));
        assert_eq!(sprite.texel(5, 8), [10, 20, 30, 255]);
        assert_eq!(store.catalog().size_of("player"), Some((6, 9)));
    }

    #[test]
    fn missing_sprite_fails_with_path() {
        let dir = TempDir::new().expect("tempdir");
        let err = SpriteStore::load_all(dir.path(), &["tree0"]).expect_err("missing");
        assert_eq!(err.key(), "tree0");
        match err {
            SpriteLoadError::Open { path, .. } => assert!(path.ends_with("tree0.png")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_key_fails_before_touching_disk() {
        let dir = TempDir::new().expect("tempdir");
        let err = SpriteStore::load_all(dir.path(), &["../secret"]).expect_err("invalid");
        assert!(matches!(err, SpriteLoadError::InvalidKey { .. }));
        assert_eq!(err.key(), "../secret");
        assert_eq!(err.path(), None);
    }

    #[test]
    fn texel_lookup_clamps_to_edges() {
        let sprite = LoadedSprite {
            width: 1,
            height: 1,
            rgba: vec![1, 2, 3, 4],
        };
        assert_eq!(sprite.texel(9, 9), [1, 2, 3, 4]);
    }
}
