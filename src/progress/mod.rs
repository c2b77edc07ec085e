//! Learning progress
//!
//! This module provides:
//! - Per-source learned/skipped state (`ProgressRecord`)
//! - A pluggable durable key/value store for that state
//! - The `ProgressTracker`, which writes through on every change

pub mod kv;
pub mod models;
pub mod tracker;

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use models::ProgressRecord;
pub use tracker::{ProgressTracker, PROGRESS_KEY};
