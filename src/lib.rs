//! Vocabulary flashcards: named word sources, per-source learning progress,
//! and the engine deciding which word to show next.

pub mod config;
pub mod progress;
pub mod selector;
pub mod server;
pub mod session;
pub mod words;

pub use config::{AppConfig, ConfigError};
pub use progress::{ProgressRecord, ProgressTracker};
pub use selector::{Selection, SelectionPolicy, WordSelector};
pub use session::{SessionError, SessionEvent, SessionStats, StudySession};
pub use words::{FileSourceStore, HttpSourceStore, Source, SourceStore, SourceStoreError, WordEntry};
