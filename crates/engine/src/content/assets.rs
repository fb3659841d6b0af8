use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::ImageReader;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::app::{BitmapFont, FontError, Sprite};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid asset manifest {path} at {json_path}: {source}")]
    Manifest {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("asset path '{path}' must be relative and stay inside the asset directory")]
    InvalidPath { path: String },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image {path} has inconsistent dimensions")]
    BadDimensions { path: PathBuf },
    #[error("font sheet is unusable: {0}")]
    Font(#[from] FontError),
    #[error("font first_char must be exactly one character, got '{0}'")]
    FirstChar(String),
    #[error("asset '{name}' is not declared in the manifest")]
    Missing { name: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    sprites: BTreeMap<String, SpriteEntry>,
    #[serde(default)]
    sounds: Vec<String>,
    #[serde(default)]
    music: Vec<String>,
    font: FontEntry,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpriteEntry {
    path: String,
    /// Horizontal strips are sliced into frames of this width.
    frame_width: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FontEntry {
    path: String,
    glyph_width: u32,
    glyph_height: u32,
    first_char: String,
}

/// Decoded sprites keyed by manifest name, plus the declared sound and music
/// names that the audio sink is allowed to play.
#[derive(Debug, Clone)]
pub struct AssetStore {
    frames: HashMap<String, Rc<[Sprite]>>,
    sounds: Vec<String>,
    music: Vec<String>,
    font: BitmapFont,
}

impl AssetStore {
    pub fn new(font: BitmapFont) -> Self {
        Self {
            frames: HashMap::new(),
            sounds: Vec::new(),
            music: Vec::new(),
            font,
        }
    }

    pub fn with_frames(mut self, name: impl Into<String>, frames: Vec<Sprite>) -> Self {
        self.frames.insert(name.into(), frames.into());
        self
    }

    pub fn with_sound(mut self, name: impl Into<String>) -> Self {
        self.sounds.push(name.into());
        self
    }

    pub fn with_music(mut self, name: impl Into<String>) -> Self {
        self.music.push(name.into());
        self
    }

    pub fn load(assets_dir: &Path) -> Result<Self, AssetError> {
        let manifest_path = assets_dir.join(MANIFEST_FILE);
        let raw = fs::read_to_string(&manifest_path).map_err(|source| AssetError::Read {
            path: manifest_path.clone(),
            source,
        })?;
        let manifest = parse_manifest(&manifest_path, &raw)?;

        let font_sheet = load_sprite(&resolve_asset_path(assets_dir, &manifest.font.path)?)?;
        let mut first_chars = manifest.font.first_char.chars();
        let first_char = match (first_chars.next(), first_chars.next()) {
            (Some(ch), None) => ch,
            _ => return Err(AssetError::FirstChar(manifest.font.first_char)),
        };
        let font = BitmapFont::new(
            font_sheet,
            manifest.font.glyph_width,
            manifest.font.glyph_height,
            first_char,
        )?;

        let mut store = Self::new(font);
        for (name, entry) in manifest.sprites {
            let sheet = load_sprite(&resolve_asset_path(assets_dir, &entry.path)?)?;
            let frames = match entry.frame_width {
                Some(frame_width) => sheet.split_strip(frame_width),
                None => vec![sheet],
            };
            store.frames.insert(name, frames.into());
        }
        store.sounds = manifest.sounds;
        store.music = manifest.music;

        info!(
            dir = %assets_dir.display(),
            sprites = store.frames.len(),
            sounds = store.sounds.len(),
            music = store.music.len(),
            "assets_loaded"
        );
        Ok(store)
    }

    pub fn frames(&self, name: &str) -> Result<Rc<[Sprite]>, AssetError> {
        self.frames
            .get(name)
            .filter(|frames| !frames.is_empty())
            .cloned()
            .ok_or_else(|| AssetError::Missing {
                name: name.to_string(),
            })
    }

    /// First frame of a named sprite.
    pub fn sprite(&self, name: &str) -> Result<Sprite, AssetError> {
        let frames = self.frames(name)?;
        frames.first().cloned().ok_or_else(|| AssetError::Missing {
            name: name.to_string(),
        })
    }

    pub fn font(&self) -> &BitmapFont {
        &self.font
    }

    pub fn sound_names(&self) -> &[String] {
        &self.sounds
    }

    pub fn music_names(&self) -> &[String] {
        &self.music
    }

    pub fn require_sound(&self, name: &str) -> Result<(), AssetError> {
        require_declared(&self.sounds, name)
    }

    pub fn require_music(&self, name: &str) -> Result<(), AssetError> {
        require_declared(&self.music, name)
    }
}

fn require_declared(declared: &[String], name: &str) -> Result<(), AssetError> {
    if declared.iter().any(|entry| entry == name) {
        Ok(())
    } else {
        Err(AssetError::Missing {
            name: name.to_string(),
        })
    }
}

fn parse_manifest(path: &Path, raw: &str) -> Result<Manifest, AssetError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, Manifest>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        AssetError::Manifest {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}

fn resolve_asset_path(assets_dir: &Path, relative: &str) -> Result<PathBuf, AssetError> {
    let escapes = relative.is_empty()
        || relative.starts_with('/')
        || relative.contains('\\')
        || relative.split('/').any(|segment| segment == "..");
    if escapes {
        return Err(AssetError::InvalidPath {
            path: relative.to_string(),
        });
    }
    Ok(assets_dir.join(relative))
}

fn load_sprite(path: &Path) -> Result<Sprite, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    let (width, height) = (image.width(), image.height());
    Sprite::from_rgba(width, height, image.into_raw()).ok_or_else(|| AssetError::BadDimensions {
        path: path.to_path_buf(),
    })
}
