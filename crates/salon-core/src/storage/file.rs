use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{KeyValueStore, StorageResult};

/// Storage file name in the cache directory
pub const STORAGE_FILE: &str = "storage.json";

/// JSON-file backed store.
///
/// The whole map is rewritten on every `set`/`remove`, so a change is on disk
/// before the call returns. Keys written by other components share the file
/// and are left alone, whatever their JSON type; only string values are
/// visible through `get`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; a file that
    /// cannot be parsed as a JSON object is logged and also treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Storage file is corrupt, starting empty");
                    Map::new()
                }
            }
        } else {
            Map::new()
        };
        debug!(path = %path.display(), keys = entries.len(), "Storage file opened");
        Ok(Self { path, entries })
    }

    /// Open `storage.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> StorageResult<Self> {
        Self::open(dir.join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Write the map, putting `key` back to `previous` if the write fails.
    fn commit(&mut self, key: &str, previous: Option<Value>) -> StorageResult<()> {
        if let Err(e) = self.flush() {
            match previous {
                Some(value) => self.entries.insert(key.to_string(), value),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let previous = self.entries.insert(key.to_string(), Value::String(value.to_string()));
        self.commit(key, previous)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        match self.entries.remove(key) {
            Some(previous) => self.commit(key, Some(previous)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::in_dir(dir.path()).unwrap();
            store.set("token", "abc123").unwrap();
            store.set("username", "alice").unwrap();
        }

        let store = FileStore::in_dir(dir.path()).unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc123"));
        assert_eq!(store.get("username").unwrap().as_deref(), Some("alice"));
        assert_eq!(store.get("userId").unwrap(), None);
    }

    #[test]
    fn test_file_store_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(dir.path()).unwrap();
        store.set("token", "abc123").unwrap();
        store.set("theme", "dark").unwrap();
        store.remove("token").unwrap();
        store.remove("token").unwrap();

        let reopened = FileStore::in_dir(dir.path()).unwrap();
        assert_eq!(reopened.get("token").unwrap(), None);
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_store_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn test_file_store_keeps_foreign_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        std::fs::write(&path, r#"{"theme": 1, "layout": {"compact": true}, "token": "abc"}"#).unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(store.get("theme").unwrap(), None);
        store.set("username", "alice").unwrap();
        store.remove("token").unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], serde_json::json!(1));
        assert_eq!(raw["layout"], serde_json::json!({"compact": true}));
        assert_eq!(raw["username"], serde_json::json!("alice"));
        assert!(raw.get("token").is_none());
    }

    #[test]
    fn test_file_store_non_object_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        std::fs::write(&path, r#"["token", "abc"]"#).unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join(STORAGE_FILE);
        let mut store = FileStore::open(&path).unwrap();
        store.set("isAdmin", "false").unwrap();
        assert!(path.exists());
    }
}
