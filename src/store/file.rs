//! File-based session store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use super::{Result, SessionStore, StoreError};
use crate::core::SessionState;

/// On-disk encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreFormat {
    /// Human-readable JSON. Also reads saves written by the browser game.
    #[default]
    Json,

    /// Compact bincode.
    Bincode,
}

impl StoreFormat {
    fn extension(self) -> &'static str {
        match self {
            StoreFormat::Json => "json",
            StoreFormat::Bincode => "bin",
        }
    }

    fn encode(self, state: &SessionState) -> Result<Vec<u8>> {
        match self {
            StoreFormat::Json => {
                serde_json::to_vec_pretty(state).map_err(|e| StoreError::Json(e.to_string()))
            }
            StoreFormat::Bincode => {
                bincode::serialize(state).map_err(|e| StoreError::Serialization(e.to_string()))
            }
        }
    }

    fn decode(self, bytes: &[u8]) -> Result<SessionState> {
        match self {
            StoreFormat::Json => {
                serde_json::from_slice(bytes).map_err(|e| StoreError::Json(e.to_string()))
            }
            StoreFormat::Bincode => {
                bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
            }
        }
    }
}

/// Stores one session as `{key}.json` or `{key}.bin` under a base directory.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-save leaves the previous session intact.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    base_dir: PathBuf,
    key: String,
    format: StoreFormat,
}

impl FileSessionStore {
    /// Open a store, creating `base_dir` if needed.
    pub async fn open(base_dir: impl AsRef<Path>, key: impl Into<String>, format: StoreFormat) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;
        Ok(Self {
            base_dir,
            key: key.into(),
            format,
        })
    }

    /// Encoding used by this store.
    #[must_use]
    pub fn format(&self) -> StoreFormat {
        self.format
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}", self.key, self.format.extension()))
    }

    fn temp_path(&self) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}.tmp", self.key, self.format.extension()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<SessionState>> {
        let path = self.path();
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let state = self.format.decode(&bytes)?;

        debug!(path = %path.display(), "session loaded");

        Ok(Some(state))
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        let path = self.path();
        let temp_path = self.temp_path();

        let bytes = self.format.encode(&state.stamped())?;

        fs::write(&temp_path, bytes).await?;
        fs::rename(&temp_path, &path).await?;

        debug!(path = %path.display(), "session saved");

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(self.path()).await {
            Ok(()) => {
                debug!(key = %self.key, "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
