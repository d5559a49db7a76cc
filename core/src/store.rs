//! Key-value persistence seam used by `Session`.
//!
//! The engine never touches the filesystem; sessions talk to a `Store` and
//! implementations decide where the JSON values live. Writes are
//! fire-and-forget: an implementation that fails to persist must swallow
//! the failure (logging it if it can) rather than surface it mid-move.

use std::collections::HashMap;

use serde_json::Value;

/// Store key for the serialized grid.
pub const GRID_KEY: &str = "grid";
/// Store key for the current score.
pub const SCORE_KEY: &str = "score";
/// Store key for the best score ever achieved.
pub const BEST_KEY: &str = "best";

/// String-keyed store of JSON values.
pub trait Store {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

// =============================================================================
// Tests
// =============================================================================
