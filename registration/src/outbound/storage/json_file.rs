//! Key-value store persisted as one JSON object file.
//!
//! All keys live in a single `{"key": "value", ...}` document inside a
//! capability-scoped directory. Every write rewrites the document through
//! [`replace_file`](super::atomic_io::replace_file), and a mutex serialises
//! read-modify-write cycles within the process.

use std::collections::BTreeMap;
use std::io;
use std::sync::{Mutex, MutexGuard};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use super::atomic_io::replace_file;
use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

type Entries = BTreeMap<String, String>;

/// Key-value store backed by a JSON file.
#[derive(Debug)]
pub struct JsonFileKeyValueStore {
    dir: Dir,
    file: Utf8PathBuf,
    guard: Mutex<()>,
}

impl JsonFileKeyValueStore {
    /// Use `file` inside an already opened directory.
    #[must_use]
    pub fn new(dir: Dir, file: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dir,
            file: file.into(),
            guard: Mutex::new(()),
        }
    }

    /// Create `dir_path` if needed and use `file` inside it.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueStoreError::Io`] when the directory cannot be
    /// created or opened.
    pub fn open(
        dir_path: &Utf8Path,
        file: impl Into<Utf8PathBuf>,
    ) -> Result<Self, KeyValueStoreError> {
        let describe = |error: io::Error| {
            KeyValueStoreError::io(format!("cannot open store directory '{dir_path}': {error}"))
        };
        Dir::create_ambient_dir_all(dir_path, ambient_authority()).map_err(describe)?;
        let dir = Dir::open_ambient_dir(dir_path, ambient_authority()).map_err(describe)?;
        Ok(Self::new(dir, file))
    }

    /// Name of the backing file inside the store directory.
    #[must_use]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, KeyValueStoreError> {
        self.guard
            .lock()
            .map_err(|_| KeyValueStoreError::io("store file mutex poisoned"))
    }

    fn read_entries(&self) -> Result<Entries, KeyValueStoreError> {
        let raw = match self.dir.read_to_string(&self.file) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(error) => {
                return Err(KeyValueStoreError::io(format!(
                    "cannot read '{}': {error}",
                    self.file
                )));
            }
        };
        if raw.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&raw).map_err(|error| {
            KeyValueStoreError::corrupt(format!("'{}' is not a string map: {error}", self.file))
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), KeyValueStoreError> {
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|error| KeyValueStoreError::corrupt(error.to_string()))?;
        replace_file(&self.dir, &self.file, &contents).map_err(|error| {
            KeyValueStoreError::io(format!("cannot write '{}': {error}", self.file))
        })
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        let _held = self.lock()?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        let _held = self.lock()?;
        let mut entries = self.read_entries()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_entries(&entries)?;
        debug!(key, file = %self.file, "store entry written");
        Ok(())
    }
}
