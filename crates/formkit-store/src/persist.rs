//! Persistence collaborator
//!
//! The store only ever writes one document, the [`PersistedState`] encoded
//! as JSON text, under one key. [`BlobStore`] abstracts where that text
//! lives.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::state::PersistedState;

/// Errors from the persistence layer
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode state: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode stored state: {0}")]
    Decode(#[source] serde_json::Error),

    /// Keys become file names and must stay inside the store directory
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

impl PersistError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Key/value text storage
pub trait BlobStore: Send + Sync + Debug {
    /// Text stored under `key`, if any
    ///
    /// # Errors
    /// Backend failures; a missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Replace the text under `key`
    ///
    /// # Errors
    /// Backend failures.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Delete `key`; deleting a missing key succeeds
    ///
    /// # Errors
    /// Backend failures.
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// Read and decode the persisted state under `key`
///
/// # Errors
/// Backend failures or undecodable text.
pub fn load_state(blobs: &dyn BlobStore, key: &str) -> Result<Option<PersistedState>, PersistError> {
    blobs
        .get(key)?
        .map(|text| serde_json::from_str(&text).map_err(PersistError::Decode))
        .transpose()
}

/// Encode and write `state` under `key`
///
/// # Errors
/// Encoding or backend failures.
pub fn save_state(blobs: &dyn BlobStore, key: &str, state: &PersistedState) -> Result<(), PersistError> {
    let text = serde_json::to_string(state).map_err(PersistError::Encode)?;
    blobs.set(key, &text)
}

/// In-memory store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash never leaves a half-written document behind.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Store rooted at `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`
    ///
    /// # Errors
    /// `InvalidKey` for empty keys or keys containing path separators.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, PersistError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\'])
            && !key.contains('\0');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistError::io(&path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| PersistError::io(&self.dir, e))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value).map_err(|e| PersistError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| PersistError::io(&path, e))?;

        tracing::trace!(path = %path.display(), bytes = value.len(), "wrote blob");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistError::io(&path, e)),
        }
    }
}
