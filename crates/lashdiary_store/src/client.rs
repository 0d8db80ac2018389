// --- File: crates/lashdiary_store/src/client.rs ---
//! Data store client for the LashDiary backend.
//!
//! One `JsonStore` serves the whole process; collections are addressed by
//! key (`consultations`, `showcase_bookings`, ...) and stored as
//! `<data_dir>/<key>.json`.

use crate::error::StoreError;
use lashdiary_config::StoreConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::fs;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// File-backed JSON key/value store.
///
/// Individual `read` and `write` calls are atomic at the file level
/// (rename into place), but a read followed by a write is not. Callers
/// that need read-modify-write semantics must go through [`update`] or
/// hold the collection's [`lock`] across both calls.
///
/// [`update`]: JsonStore::update
/// [`lock`]: JsonStore::lock
pub struct JsonStore {
    data_dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    tmp_counter: AtomicU64,
}

impl JsonStore {
    /// Open the store, creating the data directory if needed.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let data_dir = PathBuf::from(&config.data_dir);
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            locks: Mutex::new(HashMap::new()),
            tmp_counter: AtomicU64::new(0),
        })
    }

    /// Open the store over an explicit directory. Used by tests.
    pub fn at_path(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir)?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            locks: Mutex::new(HashMap::new()),
            tmp_counter: AtomicU64::new(0),
        })
    }

    /// Read a collection, returning `fallback` if the file does not exist
    /// yet. A file that exists but fails to parse is an error, never the
    /// fallback.
    pub async fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> Result<T, StoreError> {
        let path = self.collection_path(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(fallback),
            Err(err) => Err(err.into()),
        }
    }

    /// Rewrite a collection wholesale. The value is serialized to a temp
    /// file in the data directory and renamed into place, so readers never
    /// observe a torn file.
    pub async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.collection_path(key)?;
        let bytes = serde_json::to_vec_pretty(value)?;

        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let tmp_path = self.data_dir.join(format!("{key}.{n}.tmp"));
        fs::write(&tmp_path, &bytes).await?;
        fs::rename(&tmp_path, &path).await?;
        debug!(key, bytes = bytes.len(), "collection persisted");
        Ok(())
    }

    /// Acquire the commit lock for a collection.
    ///
    /// Used by commit paths that must scan one collection while appending
    /// to another. Callers taking more than one lock must take them in a
    /// fixed order (the booking pipeline locks `consultations` before
    /// `showcase_bookings`) so two commits can never deadlock.
    pub async fn lock(&self, key: &str) -> Result<OwnedMutexGuard<()>, StoreError> {
        // Validate before locking so a bad key fails loudly
        self.collection_path(key)?;
        let mutex = {
            let mut locks = self.locks.lock().expect("store lock table poisoned");
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        Ok(mutex.lock_owned().await)
    }

    /// Read-modify-write a collection under its commit lock.
    ///
    /// The lock is held across the read, the closure and the write, so
    /// concurrent `update` calls for the same key serialize and each
    /// closure sees the previous one's result. The closure's return value
    /// is passed through.
    pub async fn update<T, R, F>(&self, key: &str, fallback: T, f: F) -> Result<R, StoreError>
    where
        T: DeserializeOwned + Serialize,
        F: FnOnce(&mut T) -> R,
    {
        let _guard = self.lock(key).await?;
        let mut value = self.read(key, fallback).await?;
        let result = f(&mut value);
        self.write(key, &value).await?;
        Ok(result)
    }

    fn collection_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{key}.json")))
    }
}
