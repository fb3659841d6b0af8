use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::write_text_atomic;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::settings::{GameFlags, PlayerSettings, SettingsInvariantError};

pub(crate) const PLAYER_SAVE_FILE: &str = "player_save.json";
pub(crate) const GAME_FLAGS_FILE: &str = "game_flags.json";

#[derive(Debug, Error)]
pub(crate) enum SaveError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed save {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("save {path} is inconsistent: {source}")]
    Invariant {
        path: PathBuf,
        #[source]
        source: SettingsInvariantError,
    },
    #[error("failed to encode save: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads and writes the two JSON records under the save directory. A
/// missing file yields the default record; a malformed one is an error.
#[derive(Debug, Clone)]
pub(crate) struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub(crate) fn player_path(&self) -> PathBuf {
        self.dir.join(PLAYER_SAVE_FILE)
    }

    pub(crate) fn flags_path(&self) -> PathBuf {
        self.dir.join(GAME_FLAGS_FILE)
    }

    pub(crate) fn load_settings(&self) -> Result<PlayerSettings, SaveError> {
        let path = self.player_path();
        let settings: PlayerSettings = read_record(&path)?;
        settings
            .check_invariant()
            .map_err(|source| SaveError::Invariant {
                path: path.clone(),
                source,
            })?;
        Ok(settings)
    }

    pub(crate) fn load_flags(&self) -> Result<GameFlags, SaveError> {
        read_record(&self.flags_path())
    }

    pub(crate) fn write_settings(&self, settings: &PlayerSettings) -> Result<(), SaveError> {
        write_record(&self.player_path(), settings)
    }

    pub(crate) fn write_flags(&self, flags: &GameFlags) -> Result<(), SaveError> {
        write_record(&self.flags_path(), flags)
    }

    /// Best-effort save point: one retry, then a warning.
    pub(crate) fn persist_settings(&self, settings: &PlayerSettings) -> bool {
        with_retry("player_save", || self.write_settings(settings))
    }

    pub(crate) fn persist_flags(&self, flags: &GameFlags) -> bool {
        with_retry("game_flags", || self.write_flags(flags))
    }
}

fn read_record<T: DeserializeOwned + Default>(path: &Path) -> Result<T, SaveError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "save_missing_using_defaults");
            return Ok(T::default());
        }
        Err(source) => {
            return Err(SaveError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        SaveError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}

fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(record)?;
    write_text_atomic(path, &json).map_err(|source| SaveError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn with_retry(record: &'static str, mut write: impl FnMut() -> Result<(), SaveError>) -> bool {
    match write() {
        Ok(()) => {
            info!(record, "save_written");
            return true;
        }
        Err(error) => warn!(record, error = %error, "save_retry"),
    }
    match write() {
        Ok(()) => {
            info!(record, "save_written");
            true
        }
        Err(error) => {
            warn!(record, error = %error, "save_failed");
            false
        }
    }
}
