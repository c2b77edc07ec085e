//! Study session: one active source, its progress, and the word on screen.
//!
//! The presentation layer drives a session through `select_source`,
//! `select_next`, `mark_learned`, `mark_skipped`, `unmark_learned` and
//! `reset`, and listens for `SessionEvent`s to re-render.
//!
//! Source loads are tagged with a `LoadTicket`. When a second source is
//! requested before the first load finishes, the first result is dropped
//! on arrival.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::progress::ProgressTracker;
use crate::selector::{Selection, SelectionPolicy, WordSelector};
use crate::words::{Source, SourceStore, SourceStoreError, StoreResult, WordEntry};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No source selected")]
    NoActiveSource,

    #[error(transparent)]
    Store(#[from] SourceStoreError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Counts for the active source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub learned: usize,
    pub skipped: usize,
    pub total: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SourceChanged { name: String },
    WordChanged(WordEntry),
    Completed { source: String, stats: SessionStats },
    Error(String),
}

/// Identifies one source load request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    name: String,
    seq: u64,
}

type Listener = Box<dyn FnMut(&SessionEvent) + Send>;

pub struct StudySession {
    store: Arc<dyn SourceStore>,
    tracker: ProgressTracker,
    selector: WordSelector,
    active: Option<Source>,
    pending: Option<LoadTicket>,
    next_seq: u64,
    listeners: Vec<Listener>,
}

impl StudySession {
    pub fn new(store: Arc<dyn SourceStore>, tracker: ProgressTracker, selector: WordSelector) -> Self {
        Self {
            store,
            tracker,
            selector,
            active: None,
            pending: None,
            next_seq: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a listener for state changes
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: SessionEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    /// Announce a store failure to listeners and hand it back to the caller
    fn report<T>(&mut self, result: StoreResult<T>) -> Result<T> {
        result.map_err(|e| {
            self.emit(SessionEvent::Error(e.to_string()));
            SessionError::Store(e)
        })
    }

    pub fn store(&self) -> &dyn SourceStore {
        self.store.as_ref()
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.selector.policy()
    }

    pub fn active_source(&self) -> Option<&Source> {
        self.active.as_ref()
    }

    pub fn current_word(&self) -> Option<&WordEntry> {
        self.selector.current_word()
    }

    pub fn is_completed(&self) -> bool {
        self.selector.is_completed()
    }

    fn active_name(&self) -> Result<String> {
        self.active
            .as_ref()
            .map(|s| s.name.clone())
            .ok_or(SessionError::NoActiveSource)
    }

    // ==================== Sources ====================

    pub fn list_sources(&mut self) -> Result<Vec<Source>> {
        let result = self.store.list_sources();
        self.report(result)
    }

    /// Start loading a source. Only the most recent ticket will be applied.
    pub fn begin_load(&mut self, name: &str) -> LoadTicket {
        self.next_seq += 1;
        let ticket = LoadTicket {
            name: name.to_string(),
            seq: self.next_seq,
        };
        self.pending = Some(ticket.clone());
        ticket
    }

    /// Apply a finished load. Returns `Ok(false)` when a newer request has
    /// superseded this one and the result was dropped.
    pub fn finish_load(&mut self, ticket: &LoadTicket, result: StoreResult<Source>) -> Result<bool> {
        if self.pending.as_ref() != Some(ticket) {
            log::debug!("Dropping stale load of '{}'", ticket.name);
            return Ok(false);
        }
        self.pending = None;

        let source = self.report(result)?;
        self.tracker.ensure_initialized(&source.name);
        self.selector.reset();

        let name = source.name.clone();
        log::info!("Studying '{}' ({} words)", name, source.words.len());
        self.active = Some(source);
        self.emit(SessionEvent::SourceChanged { name });
        Ok(true)
    }

    /// Load and activate a source in one step
    pub fn select_source(&mut self, name: &str) -> Result<()> {
        let ticket = self.begin_load(name);
        let result = self.store.get_source(name);
        self.finish_load(&ticket, result)?;
        Ok(())
    }

    /// Create or overwrite a source
    pub fn import_source(
        &mut self,
        name: &str,
        words: Vec<WordEntry>,
        origin_link: Option<String>,
    ) -> Result<Source> {
        let result = self.store.save_source(name, words, origin_link);
        let source = self.report(result)?;
        self.refresh_active(&source);
        Ok(source)
    }

    pub fn add_word(&mut self, name: &str, entry: WordEntry) -> Result<Source> {
        let result = self.store.add_word(name, entry);
        let source = self.report(result)?;
        self.refresh_active(&source);
        Ok(source)
    }

    pub fn remove_word(&mut self, name: &str, term: &str) -> Result<Source> {
        let result = self.store.remove_word(name, term);
        let source = self.report(result)?;
        self.refresh_active(&source);
        Ok(source)
    }

    /// Delete a source together with its progress
    pub fn delete_source(&mut self, name: &str) -> Result<()> {
        let result = self.store.delete_source(name);
        self.report(result)?;
        self.tracker.forget(name);

        if self.active.as_ref().map_or(false, |s| s.name == name) {
            self.active = None;
            self.pending = None;
            self.selector.reset();
        }
        Ok(())
    }

    /// Keep the in-memory copy in step with a mutated active source
    fn refresh_active(&mut self, source: &Source) {
        if let Some(active) = self.active.as_mut() {
            if active.name == source.name {
                *active = source.clone();
                self.selector.reset();
            }
        }
    }

    // ==================== Study flow ====================

    /// Pick the next word of the active source
    pub fn select_next(&mut self) -> Result<Selection> {
        let name = self.active_name()?;
        self.tracker.ensure_initialized(&name);
        let record = self.tracker.record(&name).cloned().unwrap_or_default();

        let source = self.active.as_ref().ok_or(SessionError::NoActiveSource)?;
        let selection = self.selector.select_next(source, &record);

        match &selection {
            Selection::Word { entry, position } => {
                if self.selector.policy().is_ordered() {
                    self.tracker.set_current_index(&name, *position);
                }
                let entry = entry.clone();
                self.emit(SessionEvent::WordChanged(entry));
            }
            Selection::Completed => {
                let stats = self.stats()?;
                self.emit(SessionEvent::Completed {
                    source: name,
                    stats,
                });
            }
        }
        Ok(selection)
    }

    /// Mark a term learned and move on to the next word
    pub fn mark_learned(&mut self, term: &str) -> Result<Selection> {
        let name = self.active_name()?;
        self.tracker.mark_learned(&name, term);
        self.select_next()
    }

    /// Mark a term skipped and move on to the next word
    pub fn mark_skipped(&mut self, term: &str) -> Result<Selection> {
        let name = self.active_name()?;
        self.tracker.mark_skipped(&name, term);
        self.select_next()
    }

    /// Learn the word on screen (or just advance if none is shown)
    pub fn learn_current(&mut self) -> Result<Selection> {
        match self.current_word().map(|w| w.term.clone()) {
            Some(term) => self.mark_learned(&term),
            None => self.select_next(),
        }
    }

    /// Skip the word on screen (or just advance if none is shown)
    pub fn skip_current(&mut self) -> Result<Selection> {
        match self.current_word().map(|w| w.term.clone()) {
            Some(term) => self.mark_skipped(&term),
            None => self.select_next(),
        }
    }

    /// Put a learned term back into rotation. Leaves `Completed` when it
    /// actually changed something.
    pub fn unmark_learned(&mut self, term: &str) -> Result<bool> {
        let name = self.active_name()?;
        let changed = self.tracker.unmark_learned(&name, term);
        if changed && self.selector.is_completed() {
            self.selector.reset();
        }
        Ok(changed)
    }

    /// Clear all progress for the active source and start over
    pub fn reset(&mut self) -> Result<Selection> {
        let name = self.active_name()?;
        self.tracker.reset(&name);
        self.selector.reset();
        self.select_next()
    }

    pub fn stats(&self) -> Result<SessionStats> {
        let source = self.active.as_ref().ok_or(SessionError::NoActiveSource)?;
        let (learned, skipped) = match self.tracker.record(&source.name) {
            Some(record) => (
                record.learned_in(source),
                source.words.iter().filter(|w| record.is_skipped(&w.term)).count(),
            ),
            None => (0, 0),
        };
        let total = source.words.len();
        Ok(SessionStats {
            learned,
            skipped,
            total,
            remaining: total - learned,
        })
    }
}
