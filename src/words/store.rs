//! Storage for vocabulary sources
//!
//! Directory layout of the file-backed store:
//! ```text
//! sources/
//! ├── {name}.data    # optional `#link:` line followed by a JSON array
//! └── {name}.json    # legacy: bare array, or {"words": [...], "originLink": ...}
//! ```
//! `.data` always wins over a `.json` file with the same name, and is the
//! only format ever written.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::data_file;
use super::models::*;

#[derive(Error, Debug)]
pub enum SourceStoreError {
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Failed to load source '{name}': {reason}")]
    SourceLoad { name: String, reason: String },

    #[error("Invalid word list: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<WordListProblem> for SourceStoreError {
    fn from(problem: WordListProblem) -> Self {
        Self::Validation(problem.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SourceStoreError>;

/// Named vocabulary sets, whatever backs them.
///
/// Implementations never touch learning progress; callers that delete a
/// source are responsible for clearing its progress too.
pub trait SourceStore: Send + Sync {
    /// All sources that could be loaded. A malformed source is skipped with a
    /// warning; only an unreachable backing fails the whole listing.
    fn list_sources(&self) -> Result<Vec<Source>>;

    fn get_source(&self, name: &str) -> Result<Source>;

    /// Create or overwrite a source with a validated word list
    fn save_source(
        &self,
        name: &str,
        words: Vec<WordEntry>,
        origin_link: Option<String>,
    ) -> Result<Source>;

    fn delete_source(&self, name: &str) -> Result<()>;

    /// Append one word, rewriting the full list
    fn add_word(&self, name: &str, entry: WordEntry) -> Result<Source> {
        let mut source = self.get_source(name)?;
        validate_entry(&entry, source.words.len())?;
        if source.contains(&entry.term) {
            return Err(SourceStoreError::Validation(format!(
                "'{}' already exists in '{}'",
                entry.term, name
            )));
        }
        source.words.push(entry);
        self.save_source(name, source.words, source.origin_link)
    }

    /// Remove one word by term (case-insensitive). Absent terms are a no-op.
    fn remove_word(&self, name: &str, term: &str) -> Result<Source> {
        let mut source = self.get_source(name)?;
        let key = term_key(term);
        let before = source.words.len();
        source.words.retain(|w| w.key() != key);
        if source.words.len() == before {
            return Ok(source);
        }
        self.save_source(name, source.words, source.origin_link)
    }
}

/// Legacy `.json` source files come in two shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum LegacySourceFile {
    Bare(Vec<WordEntry>),
    #[serde(rename_all = "camelCase")]
    Wrapped {
        words: Vec<WordEntry>,
        #[serde(default)]
        origin_link: Option<String>,
    },
}

/// Sources kept as flat files in one folder
pub struct FileSourceStore {
    sources_dir: PathBuf,
}

impl FileSourceStore {
    pub fn new(sources_dir: PathBuf) -> Self {
        Self { sources_dir }
    }

    /// Create the sources folder if needed
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.sources_dir)?;
        Ok(())
    }

    pub fn sources_dir(&self) -> &Path {
        &self.sources_dir
    }

    fn data_path(&self, name: &str) -> PathBuf {
        self.sources_dir.join(format!("{}.data", name))
    }

    fn legacy_path(&self, name: &str) -> PathBuf {
        self.sources_dir.join(format!("{}.json", name))
    }

    fn check_name(name: &str) -> Result<()> {
        validate_source_name(name).map_err(SourceStoreError::Validation)
    }

    /// Read one source file, mapping any read or parse failure to `SourceLoad`
    fn load_from_path(&self, name: &str, path: &Path) -> Result<Source> {
        let load_err = |reason: String| SourceStoreError::SourceLoad {
            name: name.to_string(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;

        let (words, origin_link) = if path.extension().map_or(false, |ext| ext == "json") {
            match serde_json::from_str::<LegacySourceFile>(&content)
                .map_err(|e| load_err(e.to_string()))?
            {
                LegacySourceFile::Bare(words) => (words, None),
                LegacySourceFile::Wrapped { words, origin_link } => (words, origin_link),
            }
        } else {
            let file = data_file::parse(&content).map_err(|e| load_err(e.to_string()))?;
            (file.words, file.origin_link)
        };

        // An empty file is a valid (immediately completed) source; anything
        // else must satisfy the usual word-list rules.
        if !words.is_empty() {
            validate_words(&words).map_err(|p| load_err(p.to_string()))?;
        }

        Ok(Source::new(name, words).with_origin_link(origin_link))
    }
}

impl SourceStore for FileSourceStore {
    fn list_sources(&self) -> Result<Vec<Source>> {
        if !self.sources_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.sources_dir).map_err(|e| SourceStoreError::SourceLoad {
            name: self.sources_dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut sources: Vec<Source> = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {:?}: {}", self.sources_dir, e);
                    continue;
                }
            };
            let path = entry.path();

            let is_data = path.extension().map_or(false, |ext| ext == "data");
            let is_legacy = path.extension().map_or(false, |ext| ext == "json");
            if !is_data && !is_legacy {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if is_legacy && self.data_path(name).exists() {
                continue;
            }

            match self.load_from_path(name, &path) {
                Ok(source) => sources.push(source),
                Err(e) => log::warn!("Skipping source {:?}: {}", path, e),
            }
        }

        sources.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(sources)
    }

    fn get_source(&self, name: &str) -> Result<Source> {
        Self::check_name(name)?;

        let data_path = self.data_path(name);
        if data_path.exists() {
            return self.load_from_path(name, &data_path);
        }
        let legacy_path = self.legacy_path(name);
        if legacy_path.exists() {
            return self.load_from_path(name, &legacy_path);
        }
        Err(SourceStoreError::SourceNotFound(name.to_string()))
    }

    fn save_source(
        &self,
        name: &str,
        words: Vec<WordEntry>,
        origin_link: Option<String>,
    ) -> Result<Source> {
        Self::check_name(name)?;
        validate_words(&words)?;
        self.init()?;

        let content = data_file::render(&words, origin_link.as_deref())?;
        fs::write(self.data_path(name), content)?;

        // The legacy copy would otherwise resurface after a delete of the .data file
        let legacy_path = self.legacy_path(name);
        if legacy_path.exists() {
            fs::remove_file(&legacy_path)?;
        }

        log::info!("Saved source '{}' ({} words)", name, words.len());
        Ok(Source::new(name, words).with_origin_link(origin_link))
    }

    fn delete_source(&self, name: &str) -> Result<()> {
        Self::check_name(name)?;

        let mut removed = false;
        for path in [self.data_path(name), self.legacy_path(name)] {
            if path.exists() {
                fs::remove_file(&path)?;
                removed = true;
            }
        }

        if !removed {
            return Err(SourceStoreError::SourceNotFound(name.to_string()));
        }
        log::info!("Deleted source '{}'", name);
        Ok(())
    }
}
