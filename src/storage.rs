//! Key-value persistence for taskstash
//!
//! Every collection lives under its own string key. Two backends:
//! - [`FileStorage`]: one JSON file per key in a data directory
//! - [`MemoryStorage`]: an in-process map, for tests and embedding
//!
//! # Directory Structure
//!
//! ```text
//! <data_dir>/
//!   taskstash.toml              # Optional configuration
//!   .lock                       # Held during every read-modify-write
//!   logs_task.json              # Active tasks      (key "@logs_task")
//!   logs_done.json              # Completed tasks   (key "@logs_done")
//!   logs_category.json          # Category names    (key "@logs_category")
//!   logs_pending.json           # In-flight move    (key "@logs_pending")
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::error::Result;
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Name of the lock file inside the data directory
pub const LOCK_FILE: &str = ".lock";

/// Durable string-keyed storage.
///
/// Implementations only need `get` and `set`. Backends shared between
/// processes also override [`KeyValueStore::lock`] so a whole
/// read-modify-write can run under one exclusive guard.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Acquire the cross-process guard, if the backend has one.
    fn lock(&self) -> Result<Option<FileLock>> {
        Ok(None)
    }
}

/// File-backed storage: one file per key inside `root`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path to the lock file guarding read-modify-write cycles
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// Path of the file holding `key`
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", file_stem_for_key(key)))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock::write_atomic(self.key_path(key), value.as_bytes())
    }

    fn lock(&self) -> Result<Option<FileLock>> {
        FileLock::acquire(self.lock_file(), self.lock_timeout_ms).map(Some)
    }
}

/// Map a storage key to a safe file stem.
///
/// Leading `@` is dropped and anything outside `[A-Za-z0-9_-]` becomes `_`.
fn file_stem_for_key(key: &str) -> String {
    let trimmed = key.trim_start_matches('@');
    let stem: String = trimmed
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "_".to_string()
    } else {
        stem
    }
}

/// In-memory storage. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: std::sync::Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
