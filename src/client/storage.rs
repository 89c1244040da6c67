//! Client-local key/value storage, the stand-in for browser local storage.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Key of the portal-solved flag (`"true"` / `"false"`).
pub const PORTAL_SOLVED_KEY: &str = "portalSolved";
/// Key of the JSON puzzle progress blob.
pub const PUZZLE_PROGRESS_KEY: &str = "puzzleProgress";
/// Key of the admin dashboard's bearer token.
pub const ADMIN_TOKEN_KEY: &str = "adminToken";
/// Prefix of the per-egg found flags.
pub const EASTER_EGG_KEY_PREFIX: &str = "easterEgg:";

/// Storage key of one easter egg's found flag.
pub fn easter_egg_key(id: &str) -> String {
    format!("{EASTER_EGG_KEY_PREFIX}{id}")
}

/// Errors raised by persistent client storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is not a JSON string map: {0}")]
    Format(#[from] serde_json::Error),
}

/// String key/value storage local to one client.
pub trait ClientStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Volatile in-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object file, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStorage {
    /// Open the file at `path`; a missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl ClientStorage for JsonFileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Remember the admin bearer token.
pub fn save_admin_token(
    storage: &mut impl ClientStorage,
    token: &str,
) -> Result<(), StorageError> {
    storage.set(ADMIN_TOKEN_KEY, token)
}

/// Stored admin bearer token, if any.
pub fn load_admin_token(storage: &impl ClientStorage) -> Option<String> {
    storage.get(ADMIN_TOKEN_KEY).filter(|t| !t.is_empty())
}

/// Forget the admin bearer token (logout).
pub fn clear_admin_token(storage: &mut impl ClientStorage) -> Result<(), StorageError> {
    storage.remove(ADMIN_TOKEN_KEY)
}
