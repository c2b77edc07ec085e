//! Per-source learning progress with best-effort durability

use std::collections::BTreeMap;

use chrono::Utc;

use super::kv::{read_or, KeyValueStore};
use super::models::ProgressRecord;
use crate::words::{SourceStore, StoreResult};

/// Storage key holding the progress of every source
pub const PROGRESS_KEY: &str = "vocab-swipe.progress";

/// Keeps a `ProgressRecord` per source name.
///
/// Every mutation is written through to the key/value store. A failed write
/// is logged and otherwise ignored: the in-memory state stays authoritative
/// for the rest of the session.
pub struct ProgressTracker {
    records: BTreeMap<String, ProgressRecord>,
    storage: Box<dyn KeyValueStore>,
    durable: bool,
}

impl ProgressTracker {
    /// Load any previously persisted progress from `storage`
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        let records: BTreeMap<String, ProgressRecord> =
            read_or(storage.as_ref(), PROGRESS_KEY, BTreeMap::new());
        let records = records
            .into_iter()
            .map(|(name, record)| (name, record.normalized()))
            .collect();

        Self {
            records,
            storage,
            durable: true,
        }
    }

    /// Whether the last write reached durable storage
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn record(&self, source_name: &str) -> Option<&ProgressRecord> {
        self.records.get(source_name)
    }

    /// Create an empty record if none exists
    pub fn ensure_initialized(&mut self, source_name: &str) {
        if self.records.contains_key(source_name) {
            return;
        }
        self.records
            .insert(source_name.to_string(), ProgressRecord::default());
        self.persist();
    }

    pub fn mark_learned(&mut self, source_name: &str, term: &str) -> bool {
        self.update(source_name, |record| record.learn(term))
    }

    pub fn mark_skipped(&mut self, source_name: &str, term: &str) -> bool {
        self.update(source_name, |record| record.skip(term))
    }

    pub fn unmark_learned(&mut self, source_name: &str, term: &str) -> bool {
        self.update(source_name, |record| record.unlearn(term))
    }

    /// Remember where sequential selection stopped
    pub fn set_current_index(&mut self, source_name: &str, index: usize) {
        self.update(source_name, |record| {
            let changed = record.current_index != index;
            record.current_index = index;
            changed
        });
    }

    /// Replace the record with an empty one
    pub fn reset(&mut self, source_name: &str) {
        let mut record = ProgressRecord::default();
        record.updated_at = Some(Utc::now());
        self.records.insert(source_name.to_string(), record);
        log::info!("Reset progress for '{}'", source_name);
        self.persist();
    }

    /// Drop the record entirely, used when its source is deleted
    pub fn forget(&mut self, source_name: &str) {
        if self.records.remove(source_name).is_some() {
            self.persist();
        }
    }

    pub fn learned_count(&self, source_name: &str) -> usize {
        self.records.get(source_name).map_or(0, |r| r.learned.len())
    }

    pub fn skipped_count(&self, source_name: &str) -> usize {
        self.records.get(source_name).map_or(0, |r| r.skipped.len())
    }

    /// Number of words in the source, as the store currently has it
    pub fn total_count(&self, store: &dyn SourceStore, source_name: &str) -> StoreResult<usize> {
        Ok(store.get_source(source_name)?.words.len())
    }

    /// Apply `change` and persist when it reports a modification
    fn update<F>(&mut self, source_name: &str, change: F) -> bool
    where
        F: FnOnce(&mut ProgressRecord) -> bool,
    {
        let created = !self.records.contains_key(source_name);
        let record = self.records.entry(source_name.to_string()).or_default();
        let changed = change(record);
        if changed {
            record.updated_at = Some(Utc::now());
        }
        if changed || created {
            self.persist();
        }
        changed
    }

    fn persist(&mut self) {
        let value = match serde_json::to_value(&self.records) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to serialize progress: {}", e);
                self.durable = false;
                return;
            }
        };

        let written = self.storage.write_json(PROGRESS_KEY, &value);
        if !written && self.durable {
            log::warn!("Progress could not be persisted; keeping it for this session only");
        }
        self.durable = written;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::kv::{JsonFileStore, MemoryStore};
    use crate::words::{FileSourceStore, WordEntry};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Storage that rejects every write
    struct FullStorage;

    impl KeyValueStore for FullStorage {
        fn read_json(&self, _key: &str) -> Option<Value> {
            None
        }

        fn write_json(&mut self, _key: &str, _value: &Value) -> bool {
            false
        }
    }

    /// Storage whose contents outlive the tracker, to observe writes
    #[derive(Clone, Default)]
    struct SharedStorage {
        inner: Arc<Mutex<MemoryStore>>,
        writes: Arc<AtomicUsize>,
    }

    impl SharedStorage {
        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl KeyValueStore for SharedStorage {
        fn read_json(&self, key: &str) -> Option<Value> {
            self.inner.lock().unwrap().read_json(key)
        }

        fn write_json(&mut self, key: &str, value: &Value) -> bool {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.lock().unwrap().write_json(key, value)
        }
    }

    #[test]
    fn test_ensure_initialized_is_idempotent() {
        let mut tracker = ProgressTracker::new(Box::new(MemoryStore::new()));
        assert!(tracker.record("Colors").is_none());

        tracker.ensure_initialized("Colors");
        tracker.mark_learned("Colors", "red");
        tracker.ensure_initialized("Colors");

        assert_eq!(tracker.learned_count("Colors"), 1);
    }

    #[test]
    fn test_mark_learned_twice_has_no_duplicates() {
        let mut tracker = ProgressTracker::new(Box::new(MemoryStore::new()));
        assert!(tracker.mark_learned("Colors", "red"));
        assert!(!tracker.mark_learned("Colors", "Red"));

        assert_eq!(tracker.learned_count("Colors"), 1);
    }

    #[test]
    fn test_skip_then_learn() {
        let mut tracker = ProgressTracker::new(Box::new(MemoryStore::new()));
        tracker.mark_skipped("Colors", "red");
        assert_eq!(tracker.skipped_count("Colors"), 1);

        tracker.mark_learned("Colors", "red");
        let record = tracker.record("Colors").unwrap();
        assert!(record.is_learned("red"));
        assert!(!record.is_skipped("red"));
        assert_eq!(tracker.skipped_count("Colors"), 0);
    }

    #[test]
    fn test_unmark_and_reset() {
        let mut tracker = ProgressTracker::new(Box::new(MemoryStore::new()));
        tracker.mark_learned("Colors", "red");
        tracker.mark_learned("Colors", "blue");

        assert!(tracker.unmark_learned("Colors", "RED"));
        assert!(!tracker.unmark_learned("Colors", "green"));
        assert_eq!(tracker.learned_count("Colors"), 1);

        tracker.reset("Colors");
        assert_eq!(tracker.learned_count("Colors"), 0);
        assert!(tracker.record("Colors").is_some());
    }

    #[test]
    fn test_forget() {
        let mut tracker = ProgressTracker::new(Box::new(MemoryStore::new()));
        tracker.mark_learned("Colors", "red");
        tracker.forget("Colors");
        assert!(tracker.record("Colors").is_none());
    }

    #[test]
    fn test_progress_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("progress");

        {
            let mut tracker = ProgressTracker::new(Box::new(JsonFileStore::new(dir.clone())));
            tracker.mark_learned("Colors", "Red");
            tracker.mark_skipped("Colors", "blue");
            tracker.set_current_index("Colors", 1);
        }

        let tracker = ProgressTracker::new(Box::new(JsonFileStore::new(dir)));
        let record = tracker.record("Colors").unwrap();
        assert!(record.is_learned("red"));
        assert!(record.is_skipped("blue"));
        assert_eq!(record.current_index, 1);
    }

    #[test]
    fn test_every_mutation_is_written() {
        let storage = SharedStorage::default();
        let mut tracker = ProgressTracker::new(Box::new(storage.clone()));

        tracker.mark_learned("Colors", "red");
        let saved = storage.read_json(PROGRESS_KEY).unwrap();
        assert_eq!(saved["Colors"]["learned"], serde_json::json!(["red"]));

        tracker.reset("Colors");
        let saved = storage.read_json(PROGRESS_KEY).unwrap();
        assert_eq!(saved["Colors"]["learned"], serde_json::json!([]));
    }

    #[test]
    fn test_first_mutation_writes_once() {
        let storage = SharedStorage::default();
        let mut tracker = ProgressTracker::new(Box::new(storage.clone()));

        tracker.mark_learned("Colors", "red");
        assert_eq!(storage.writes(), 1);

        // No change on an existing record: nothing to write
        tracker.mark_learned("Colors", "red");
        assert_eq!(storage.writes(), 1);

        // A new record is still persisted even when the change is a no-op
        tracker.unmark_learned("Animals", "cat");
        assert_eq!(storage.writes(), 2);
        let saved = storage.read_json(PROGRESS_KEY).unwrap();
        assert!(saved.get("Animals").is_some());
    }

    #[test]
    fn test_failed_persistence_keeps_session_state() {
        let mut tracker = ProgressTracker::new(Box::new(FullStorage));

        assert!(tracker.mark_learned("Colors", "red"));
        assert!(!tracker.is_durable());
        assert!(tracker.record("Colors").unwrap().is_learned("red"));

        tracker.mark_skipped("Colors", "blue");
        assert_eq!(tracker.skipped_count("Colors"), 1);
    }

    #[test]
    fn test_total_count_delegates_to_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSourceStore::new(temp_dir.path().to_path_buf());
        store
            .save_source("Colors", vec![WordEntry::new("red"), WordEntry::new("blue")], None)
            .unwrap();

        let tracker = ProgressTracker::new(Box::new(MemoryStore::new()));
        assert_eq!(tracker.total_count(&store, "Colors").unwrap(), 2);
        assert!(tracker.total_count(&store, "Nonexistent").is_err());
    }
}
