//! Key-value persistence backends for the countdown record

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Errors raised while persisting countdown state
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("State lock poisoned: {0}")]
    Poisoned(String),
}

/// A scalar stored under a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Scalar key-value storage the state store writes through.
///
/// `set` stages a value; `commit` makes everything staged durable.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value);

    fn commit(&mut self) -> Result<(), StoreError>;

    fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(|v| v.as_i64()).unwrap_or(default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| default.to_string())
    }
}

/// In-memory store, nothing survives the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, as if written by an earlier run
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    /// Number of successful commits so far
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.commits += 1;
        Ok(())
    }
}

/// Flat JSON object on disk, replaced atomically on every commit
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts empty. An unreadable or corrupt file is
    /// logged and also starts empty, so the countdown falls back to defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::read_values(&path);
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_values(path: &Path) -> BTreeMap<String, Value> {
        if !path.exists() {
            info!("No state file at {:?}, starting from defaults", path);
            return BTreeMap::new();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Unable to read state file {:?}: {}. Using defaults.", path, e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(values) => {
                debug!("Loaded countdown state from {:?}", path);
                values
            }
            Err(e) => {
                warn!("Failed to parse state file {:?}: {}. Using defaults.", path, e);
                BTreeMap::new()
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)?;
        let contents = serde_json::to_string(&self.values)?;
        temp.write_all(contents.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_fall_back_on_mismatch() {
        let store = MemoryStore::new()
            .with("a", Value::Text("oops".into()))
            .with("b", Value::Bool(true));

        assert_eq!(store.get_i64("a", 7), 7);
        assert!(store.get_bool("b", false));
        assert_eq!(store.get_string("missing", "x"), "x");
    }

    #[test]
    fn json_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = JsonFileStore::open(&path);
        store.set("total_seconds", Value::Int(90));
        store.set("is_running", Value::Bool(true));
        store.set("last_date", Value::Text("2026-10-16".into()));
        store.commit().unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get_i64("total_seconds", 0), 90);
        assert!(reopened.get_bool("is_running", false));
        assert_eq!(reopened.get_string("last_date", ""), "2026-10-16");
    }

    #[test]
    fn corrupt_json_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("total_seconds"), None);
    }

    #[test]
    fn memory_store_counts_commits() {
        let mut store = MemoryStore::new();
        store.set("k", Value::Int(1));
        store.commit().unwrap();
        store.commit().unwrap();
        assert_eq!(store.commits(), 2);
    }
}
