//! JSON-file backed `KeyValueStorage`.
//!
//! DESIGN
//! ======
//! All keys live in one JSON object at `<state_dir>/storage.json`. Every write
//! rewrites the whole object through a temp file that is fsynced and renamed
//! into place, so readers see either the old or the new object and never a
//! torn one. The file is re-read on every access so a second process (or a
//! later invocation of the CLI) observes the latest write.

#[cfg(test)]
#[path = "file_test.rs"]
mod file_test;

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use super::{KeyValueStorage, StorageError};

const STORAGE_FILE: &str = "storage.json";

pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Storage rooted in `state_dir`. The directory is created on first write.
    #[must_use]
    pub fn new(state_dir: &Path) -> Self {
        Self { path: state_dir.join(STORAGE_FILE), write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "storage file unreadable; treating as empty");
                return BTreeMap::new();
            }
        };
        if raw.trim().is_empty() {
            return BTreeMap::new();
        }
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "storage file is not a JSON object; treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_vec_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt as _;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp)?;
        file.write_all(&encoded)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut items = self.load();
        apply(&mut items);
        self.save(&items)
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|items| {
            items.remove(key);
        })
    }
}
