use std::{
    collections::BTreeSet,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use serde_json::Value;
use tempfile::NamedTempFile;

use super::error::StoreError;

/// A set of strings persisted as a sorted JSON array.
///
/// Nothing is cached: every read goes back to disk, and writers are
/// serialised through `write_lock` so concurrent load-modify-save cycles
/// cannot drop each other's inserts.
#[derive(Debug)]
pub struct JsonSetStore {
    label: &'static str,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonSetStore {
    pub fn new(label: &'static str, path: impl Into<PathBuf>) -> Self {
        Self {
            label,
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the set, treating a missing, unreadable or malformed file as empty.
    pub fn load(&self) -> BTreeSet<String> {
        match self.read() {
            Ok(values) => values,
            Err(StoreError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                BTreeSet::new()
            }
            Err(err) => {
                tracing::warn!(
                    target: "store",
                    store = self.label,
                    error = %err,
                    "failed to load store; treating it as empty"
                );
                BTreeSet::new()
            }
        }
    }

    pub fn read(&self) -> Result<BTreeSet<String>, StoreError> {
        let raw = fs::read(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let parsed: Value = serde_json::from_slice(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        let Value::Array(items) = parsed else {
            return Err(StoreError::NotAnArray {
                path: self.path.clone(),
            });
        };

        Ok(items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Rewrites the whole file through a temp file in the same directory.
    pub fn save(&self, values: &BTreeSet<String>) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(values)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
        temp.write_all(&payload).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(&self.path).map_err(|err| io_err(err.error))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    /// Adds every trimmed, non-empty value that is not yet present and
    /// returns how many were added. The file is only rewritten when the
    /// set changed; a failed write is logged and the count still returned.
    pub fn insert_all<I, S>(&self, values: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let _guard = self.write_lock.lock();
        let mut current = self.load();
        let mut added = 0;
        for value in values {
            let trimmed = value.as_ref().trim();
            if !trimmed.is_empty() && current.insert(trimmed.to_string()) {
                added += 1;
            }
        }

        if added > 0 {
            if let Err(err) = self.save(&current) {
                tracing::error!(
                    target: "store",
                    store = self.label,
                    error = %err,
                    "failed to save store"
                );
            } else {
                tracing::debug!(
                    target: "store",
                    store = self.label,
                    added,
                    total = current.len(),
                    "store updated"
                );
            }
        }
        added
    }

    pub fn insert(&self, value: &str) -> bool {
        self.insert_all([value]) > 0
    }
}
