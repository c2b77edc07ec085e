//! Data models for vocabulary sources

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A single vocabulary item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    /// The word itself; unique within a source (case-insensitive)
    #[serde(alias = "word")]
    pub term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    /// Definition in the source language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    /// Meaning in the target language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    /// Inflected forms
    #[serde(default)]
    pub forms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WordEntry {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            part_of_speech: None,
            pronunciation: None,
            meaning: None,
            translation: None,
            synonyms: Vec::new(),
            antonyms: Vec::new(),
            forms: Vec::new(),
            notes: None,
        }
    }

    /// Lower-cased term used for every identity comparison
    pub fn key(&self) -> String {
        term_key(&self.term)
    }
}

/// Normalize a term for case-insensitive comparison. Whitespace is
/// significant: `" red"` and `"red"` are different terms.
pub fn term_key(term: &str) -> String {
    term.to_lowercase()
}

/// A named, ordered vocabulary set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub name: String,
    pub words: Vec<WordEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_link: Option<String>,
}

impl Source {
    pub fn new(name: impl Into<String>, words: Vec<WordEntry>) -> Self {
        Self {
            name: name.into(),
            words,
            origin_link: None,
        }
    }

    pub fn with_origin_link(mut self, link: Option<String>) -> Self {
        self.origin_link = link;
        self
    }

    /// Find a word by term (case-insensitive)
    pub fn find(&self, term: &str) -> Option<&WordEntry> {
        let key = term_key(term);
        self.words.iter().find(|w| w.key() == key)
    }

    /// Whether a word with this term exists (case-insensitive)
    pub fn contains(&self, term: &str) -> bool {
        self.find(term).is_some()
    }
}

/// Why a word list was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordListProblem {
    Empty,
    BlankTerm { index: usize },
    DuplicateTerm { index: usize, term: String },
}

impl std::fmt::Display for WordListProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "word list must not be empty"),
            Self::BlankTerm { index } => write!(f, "word at index {} has an empty term", index),
            Self::DuplicateTerm { index, term } => {
                write!(f, "word at index {} duplicates term '{}'", index, term)
            }
        }
    }
}

/// Validate a single entry. Used at every ingestion point.
pub fn validate_entry(entry: &WordEntry, index: usize) -> Result<(), WordListProblem> {
    if entry.term.trim().is_empty() {
        return Err(WordListProblem::BlankTerm { index });
    }
    Ok(())
}

/// Validate a whole word list: non-empty, every term non-blank, no
/// case-insensitive duplicates.
pub fn validate_words(words: &[WordEntry]) -> Result<(), WordListProblem> {
    if words.is_empty() {
        return Err(WordListProblem::Empty);
    }

    let mut seen = HashSet::with_capacity(words.len());
    for (index, word) in words.iter().enumerate() {
        validate_entry(word, index)?;
        if !seen.insert(word.key()) {
            return Err(WordListProblem::DuplicateTerm {
                index,
                term: word.term.clone(),
            });
        }
    }
    Ok(())
}

/// Check that a source name can be used as a storage identifier
pub fn validate_source_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("source name must not be empty".to_string());
    }
    if trimmed == "." || trimmed == ".." {
        return Err(format!("'{}' is not a valid source name", name));
    }
    if trimmed.contains(['/', '\\', '\0']) {
        return Err(format!("source name '{}' contains a path separator", name));
    }
    Ok(())
}
