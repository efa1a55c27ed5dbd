//! Satoshi Storage File - durable key-value store backed by one JSON file.
//!
//! The file holds a versioned map of keys to string values:
//!
//! ```json
//! { "version": 1, "values": { "last_price_usd": "64000.5", "pf": "[...]" } }
//! ```
//!
//! Every write rewrites the whole file through a temporary sibling and a
//! rename, so a crash leaves either the old or the new contents. Writers
//! hold an exclusive advisory lock on `<file>.lock` from load to rename, so
//! processes sharing the file do not drop each other's keys. Readers take no
//! lock; the rename replaces the file in one step.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fd_lock::RwLock;
use log::debug;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use satoshi_core::errors::Error;
use satoshi_core::kv::KeyValueStore;
use satoshi_core::Result;

const CURRENT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Default)]
struct StoreFile {
    version: u32,
    values: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Opens (or lazily creates) the store at `path`. The file is not touched
    /// until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_store<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Storage("Key-value store lock poisoned".into()))?;
        fs::create_dir_all(self.dir())?;
        let mut file_lock = RwLock::new(self.open_lock_file()?);
        let _exclusive = file_lock.write()?;

        let mut values = self.load_locked()?;
        if op(&mut values) {
            self.persist_locked(&values)?;
        }
        Ok(())
    }

    fn read_store(&self) -> Result<BTreeMap<String, String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Storage("Key-value store lock poisoned".into()))?;
        self.load_locked()
    }

    fn load_locked(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = fs::read(&self.path)?;
        if raw.is_empty() {
            return Ok(BTreeMap::new());
        }

        let file: StoreFile = serde_json::from_slice(&raw)?;
        if file.version > CURRENT_VERSION {
            return Err(Error::Storage(format!(
                "{} was written by a newer version (format {})",
                self.path.display(),
                file.version
            )));
        }
        Ok(file.values)
    }

    fn persist_locked(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let file = StoreFile {
            version: CURRENT_VERSION,
            values: values.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let mut tmp = NamedTempFile::new_in(self.dir())?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| {
            Error::Storage(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e.error
            ))
        })?;
        debug!("Persisted {} keys to {}", values.len(), self.path.display());
        Ok(())
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn open_lock_file(&self) -> Result<File> {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.path.with_file_name(name))?;
        Ok(file)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_store()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_store(|values| {
            values.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_store(|values| values.remove(key).is_some())
    }
}
