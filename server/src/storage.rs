//! Narrow key-value persistence with atomic replace-on-write
//!
//! The rest of the server only ever loads a whole value or replaces a whole
//! value. Readers never observe a partially written value: the file store
//! writes to a sibling temp file and renames it over the target.

use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error on key {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Write rejected for key {0}")]
    Rejected(String),

    #[error("Persist task for key {key} did not complete: {source}")]
    Task {
        key: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Whole-value key-value store
pub trait Store: Send + Sync {
    /// Returns `None` when the key has never been written
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Atomically replaces the value stored under `key`
    fn replace(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// One JSON file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) the data directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.json.tmp"))
    }
}

impl Store for FileStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn replace(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        let temp = self.temp_path_for(key);
        let mut file = File::create(&temp).map_err(io_err)?;
        file.write_all(bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        fs::rename(&temp, self.path_for(key)).map_err(io_err)
    }
}

/// In-process store. Writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `replace` fail until switched back off
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seeds a raw value, bypassing the failure switch
    pub fn insert_raw(&self, key: &str, bytes: &[u8]) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), bytes.to_vec());
    }
}

impl Store for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn replace(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(key.to_string()));
        }
        self.insert_raw(key, bytes);
        Ok(())
    }
}

/// Loads a JSON value, treating a missing or malformed value as empty.
///
/// A missing or malformed value is immediately rewritten in its empty form.
/// A failed read is returned as an error so an intact but unreadable value
/// is never overwritten.
pub fn load_json<T>(store: &dyn Store, key: &str) -> Result<T, StoreError>
where
    T: DeserializeOwned + Serialize + Default,
{
    let bytes = match store.read(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            heal::<T>(store, key);
            return Ok(T::default());
        }
        Err(e) => {
            error!("Failed to read {}: {}", key, e);
            return Err(e);
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("Stored value for {} is malformed ({}), resetting to empty", key, e);
            heal::<T>(store, key);
            Ok(T::default())
        }
    }
}

fn heal<T>(store: &dyn Store, key: &str)
where
    T: Serialize + Default,
{
    if let Err(e) = save_json(store, key, &T::default()) {
        warn!("Could not initialise {}: {}", key, e);
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn Store,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = encode(key, value)?;
    store.replace(key, &bytes)
}

/// Async counterpart of [`save_json`] for request paths.
///
/// Encoding happens on the caller; the blocking `replace` runs on tokio's
/// blocking pool so a slow disk never stalls a runtime worker.
pub async fn persist_json<T: Serialize + ?Sized>(
    store: &Arc<dyn Store>,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = encode(key, value)?;
    let store = Arc::clone(store);
    let owned_key = key.to_string();

    tokio::task::spawn_blocking(move || store.replace(&owned_key, &bytes))
        .await
        .map_err(|source| StoreError::Task {
            key: key.to_string(),
            source,
        })?
}
