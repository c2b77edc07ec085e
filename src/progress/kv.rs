//! Durable key/value storage for client-side state

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Small JSON documents stored by key.
///
/// Reads never fail: an absent or unreadable value is `None`. Writes report
/// success as a bool and log their own failures.
pub trait KeyValueStore: Send {
    fn read_json(&self, key: &str) -> Option<Value>;

    fn write_json(&mut self, key: &str, value: &Value) -> bool;
}

/// Read and deserialize a value, falling back to `default`
pub fn read_or<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    match store.read_json(key) {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed value for '{}': {}", key, e);
            default
        }),
        None => default,
    }
}

/// One `{key}.json` file per key
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for JsonFileStore {
    fn read_json(&self, key: &str) -> Option<Value> {
        let path = self.key_path(key);
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read {:?}: {}", path, e);
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Failed to parse {:?}: {}", path, e);
                None
            }
        }
    }

    fn write_json(&mut self, key: &str, value: &Value) -> bool {
        let path = self.key_path(key);
        let tmp_path = path.with_extension("json.tmp");

        let result = fs::create_dir_all(&self.dir)
            .and_then(|_| {
                let content = serde_json::to_string_pretty(value)?;
                fs::write(&tmp_path, content)
            })
            .and_then(|_| fs::rename(&tmp_path, &path));

        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to write {:?}: {}", path, e);
                false
            }
        }
    }
}

/// Session-only storage
#[derive(Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read_json(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn write_json(&mut self, key: &str, value: &Value) -> bool {
        self.values.insert(key.to_string(), value.clone());
        true
    }
}
