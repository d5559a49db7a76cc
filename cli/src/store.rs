//! JSON-file implementation of the core `Store` trait.
//!
//! The whole key-value map lives in one JSON file and is rewritten after
//! every mutation. Writes are best-effort: a failed write is logged and
//! play continues with the in-memory copy.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::warn;
use serde_json::Value;
use slide128_core::Store;

pub struct JsonFileStore {
    path: PathBuf,
    entries: HashMap<String, Value>,
}

impl JsonFileStore {
    /// Open a store backed by `path`, loading any existing entries.
    ///
    /// A missing file starts empty; an unreadable file is an error; a
    /// corrupt file is dropped with a warning so a damaged save never
    /// blocks a new game.
    pub fn open(path: PathBuf) -> Result<JsonFileStore> {
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading save file {}", path.display()))?;
            match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(
                        "save file {} is corrupt ({}), starting fresh",
                        path.display(),
                        err
                    );
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };
        Ok(JsonFileStore { path, entries })
    }

    fn flush(&self) {
        let result = serde_json::to_string_pretty(&self.entries)
            .map_err(anyhow::Error::from)
            .and_then(|raw| fs::write(&self.path, raw).map_err(anyhow::Error::from));
        if let Err(err) = result {
            warn!("failed to write save file {}: {}", self.path.display(), err);
        }
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.flush();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut store = JsonFileStore::open(path.clone()).unwrap();
        store.set("best", json!(512));
        store.set("score", json!(64));
        store.remove("score");

        let reopened = JsonFileStore::open(path).unwrap();
        assert_eq!(reopened.get("best"), Some(json!(512)));
        assert_eq!(reopened.get("score"), None);
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(store.get("best"), None);
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(path).unwrap();
        assert_eq!(store.get("grid"), None);
    }
}
