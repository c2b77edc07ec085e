//! Data models for learning progress

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::words::{term_key, Source};

/// Learning state for one source.
///
/// Terms are stored lower-cased. A term is never both learned and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub learned: BTreeSet<String>,
    #[serde(default)]
    pub skipped: BTreeSet<String>,
    /// Resume hint for sequential selection
    #[serde(default)]
    pub current_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    pub fn is_learned(&self, term: &str) -> bool {
        self.learned.contains(&term_key(term))
    }

    pub fn is_skipped(&self, term: &str) -> bool {
        self.skipped.contains(&term_key(term))
    }

    /// Add to learned and drop from skipped. Returns whether anything changed.
    pub fn learn(&mut self, term: &str) -> bool {
        let key = term_key(term);
        if key.is_empty() {
            return false;
        }
        let unskipped = self.skipped.remove(&key);
        let added = self.learned.insert(key);
        added || unskipped
    }

    /// Add to skipped unless the term is already learned or skipped
    pub fn skip(&mut self, term: &str) -> bool {
        let key = term_key(term);
        if key.is_empty() || self.learned.contains(&key) {
            return false;
        }
        self.skipped.insert(key)
    }

    pub fn unlearn(&mut self, term: &str) -> bool {
        self.learned.remove(&term_key(term))
    }

    /// Number of words in `source` that are learned. Ignores learned terms the
    /// source no longer contains.
    pub fn learned_in(&self, source: &Source) -> usize {
        source
            .words
            .iter()
            .filter(|w| self.learned.contains(&w.key()))
            .count()
    }

    /// Lower-case every stored term and restore learned/skipped disjointness.
    /// Applied to records read back from storage.
    pub fn normalized(self) -> Self {
        let learned: BTreeSet<String> = self.learned.iter().map(|t| term_key(t)).collect();
        let skipped = self
            .skipped
            .iter()
            .map(|t| term_key(t))
            .filter(|t| !learned.contains(t))
            .collect();
        Self {
            learned,
            skipped,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::WordEntry;

    #[test]
    fn test_learn_is_idempotent_and_case_insensitive() {
        let mut record = ProgressRecord::default();
        assert!(record.learn("Red"));
        assert!(!record.learn("red"));
        assert!(!record.learn("RED"));
        assert_eq!(record.learned.len(), 1);
        assert!(record.learned.contains("red"));
    }

    #[test]
    fn test_learn_removes_from_skipped() {
        let mut record = ProgressRecord::default();
        assert!(record.skip("red"));
        assert!(record.learn("Red"));
        assert!(record.is_learned("red"));
        assert!(!record.is_skipped("red"));
    }

    #[test]
    fn test_skip_ignores_learned_and_skipped() {
        let mut record = ProgressRecord::default();
        record.learn("red");
        assert!(!record.skip("red"));
        assert!(record.skip("blue"));
        assert!(!record.skip("Blue"));
        assert_eq!(record.skipped.len(), 1);
    }

    #[test]
    fn test_blank_terms_are_ignored() {
        let mut record = ProgressRecord::default();
        assert!(!record.learn("  "));
        assert!(!record.skip(""));
        assert!(record.learned.is_empty());
    }

    #[test]
    fn test_learned_in_ignores_stale_terms() {
        let source = Source::new("Colors", vec![WordEntry::new("red"), WordEntry::new("blue")]);
        let mut record = ProgressRecord::default();
        record.learn("red");
        record.learn("purple");
        assert_eq!(record.learned_in(&source), 1);
    }

    #[test]
    fn test_normalized_restores_invariants() {
        let record: ProgressRecord = serde_json::from_str(
            r#"{"learned": ["Red", "red"], "skipped": ["RED", "Blue"], "currentIndex": 3}"#,
        )
        .unwrap();
        let record = record.normalized();

        assert_eq!(record.learned.len(), 1);
        assert!(record.is_learned("red"));
        assert!(!record.is_skipped("red"));
        assert!(record.skipped.contains("blue"));
        assert_eq!(record.current_index, 3);
    }
}
