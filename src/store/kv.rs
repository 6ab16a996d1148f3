//! String-keyed persistent slot store.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while persisting or loading the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A thread-safe slot → string map, optionally mirrored to a JSON file.
///
/// Every mutation rewrites the file; the last write wins.
#[derive(Clone, Default)]
pub struct KvStore {
    inner: Arc<DashMap<String, String>>,
    persistence_path: Option<PathBuf>,
}

impl KvStore {
    /// Create an empty store. `None` keeps it in memory only.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
        }
    }

    /// Open the store at `path`, loading existing slots if the file exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let file = File::open(path)?;
            let map: BTreeMap<String, String> = serde_json::from_reader(BufReader::new(file))?;
            for (k, v) in map {
                store.inner.insert(k, v);
            }
            tracing::debug!(path = %path.display(), slots = store.inner.len(), "Loaded key store");
        }
        Ok(store)
    }

    /// Read a slot.
    pub fn get(&self, slot: &str) -> Option<String> {
        self.inner.get(slot).map(|r| r.value().clone())
    }

    /// Write a slot, replacing any previous value.
    pub fn set(&self, slot: &str, value: &str) -> StoreResult<()> {
        self.inner.insert(slot.to_string(), value.to_string());
        self.save()
    }

    /// Remove a slot. Returns whether it was present.
    pub fn remove(&self, slot: &str) -> StoreResult<bool> {
        let removed = self.inner.remove(slot).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Names of all populated slots, sorted.
    pub fn slots(&self) -> Vec<String> {
        let mut slots: Vec<String> = self.inner.iter().map(|r| r.key().clone()).collect();
        slots.sort();
        slots
    }

    fn save(&self) -> StoreResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let map: BTreeMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        // Replace atomically: write a sibling file, then rename it over the store.
        let tmp = temp_path(path);
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, &map)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Values are secrets; only slot names are shown.
        f.debug_struct("KvStore")
            .field("slots", &self.slots())
            .field("persistence_path", &self.persistence_path)
            .finish()
    }
}
