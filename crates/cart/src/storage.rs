//! Persistent key-value storage for the serialized cart.
//!
//! Storage works like browser local storage: string keys map to string
//! values, each write replaces the whole value, and reads never partially
//! succeed.
//!
//! - [`FileStorage`] keeps every slot in one JSON object on disk
//! - [`MemoryStorage`] keeps slots in process, for tests

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::warn;

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Storage file is not a valid JSON object of strings.
    #[error("Corrupt storage file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// String-keyed slots holding serialized values.
pub trait CartStorage: Send + Sync {
    /// Read a slot. `Ok(None)` when the slot has never been written.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the contents of a slot.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be written. The previous
    /// value is left in place.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: CartStorage + ?Sized> CartStorage for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// Storage backed by a single JSON file.
///
/// The file holds an object mapping keys to string values. Writes go to a
/// sibling temporary file which is then renamed over the existing one.
///
/// Reads of a corrupt file fail. A write to a corrupt file replaces it with
/// a fresh object holding only the written slot.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Use `path` as the storage file. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the storage file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, slots: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, serde_json::to_vec_pretty(slots)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CartStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = match self.read_all() {
            Ok(slots) => slots,
            Err(StorageError::Parse(e)) => {
                warn!(path = %self.path.display(), error = %e, "Overwriting corrupt storage file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        slots.insert(key.to_string(), value.to_string());
        self.write_all(&slots)
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// Storage held in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
    read_only: AtomicBool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with one slot already written.
    #[must_use]
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        storage
    }

    /// Make every write fail, as a full disk or exceeded quota would.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }
}

impl CartStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "storage is read-only",
            )));
        }
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
