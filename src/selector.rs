//! Next-word selection
//!
//! Two policies:
//! - `Random`: uniform pick among the words not yet learned. Each pick is
//!   independent, so an unlearned word may come up again before the others.
//! - `Sequential`: the first word in stored order that is not learned.
//!   Skipping does not move it along.
//! - `SkippedLast`: like `Sequential`, but skipped words come back only once
//!   every unskipped unlearned word is learned.
//!
//! State machine per active source:
//! `Selecting -> Presenting -> {Selecting | Completed}`. `Completed` stays
//! put until `reset`.

use std::collections::VecDeque;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::progress::ProgressRecord;
use crate::words::{Source, WordEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    #[default]
    Random,
    Sequential,
    #[serde(rename = "skipped-last")]
    SkippedLast,
}

impl SelectionPolicy {
    /// Whether picks follow stored order, making the position worth remembering
    pub fn is_ordered(self) -> bool {
        !matches!(self, Self::Random)
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "sequential" => Ok(Self::Sequential),
            "skipped-last" => Ok(Self::SkippedLast),
            other => Err(format!(
                "unknown selection policy '{}' (expected random, sequential or skipped-last)",
                other
            )),
        }
    }
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Sequential => write!(f, "sequential"),
            Self::SkippedLast => write!(f, "skipped-last"),
        }
    }
}

/// Source of random indices, injectable so picks can be replayed
pub trait IndexSource: Send {
    /// An index in `0..upper`. `upper` is never zero.
    fn pick(&mut self, upper: usize) -> usize;
}

/// Indices drawn from a `rand` generator
pub struct RngIndexSource<R>(pub R);

impl RngIndexSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> IndexSource for RngIndexSource<R> {
    fn pick(&mut self, upper: usize) -> usize {
        self.0.gen_range(0..upper)
    }
}

/// A fixed sequence of indices, each reduced modulo `upper`. Yields 0 once
/// the sequence runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIndices {
    values: VecDeque<usize>,
}

impl ScriptedIndices {
    pub fn new(values: impl IntoIterator<Item = usize>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl IndexSource for ScriptedIndices {
    fn pick(&mut self, upper: usize) -> usize {
        self.values.pop_front().unwrap_or(0) % upper
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorState {
    Selecting,
    Presenting(WordEntry),
    Completed,
}

/// Outcome of asking for the next word
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The word to show and its position in the source
    Word { entry: WordEntry, position: usize },
    Completed,
}

impl Selection {
    pub fn word(&self) -> Option<&WordEntry> {
        match self {
            Self::Word { entry, .. } => Some(entry),
            Self::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

pub struct WordSelector {
    policy: SelectionPolicy,
    indices: Box<dyn IndexSource>,
    state: SelectorState,
}

impl WordSelector {
    pub fn new(policy: SelectionPolicy, indices: Box<dyn IndexSource>) -> Self {
        Self {
            policy,
            indices,
            state: SelectorState::Selecting,
        }
    }

    /// Random policy with an entropy-seeded generator
    pub fn random() -> Self {
        Self::new(SelectionPolicy::Random, Box::new(RngIndexSource::from_entropy()))
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn current_word(&self) -> Option<&WordEntry> {
        match &self.state {
            SelectorState::Presenting(word) => Some(word),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == SelectorState::Completed
    }

    /// Back to `Selecting`, leaving `Completed` if needed
    pub fn reset(&mut self) {
        self.state = SelectorState::Selecting;
    }

    /// Pick the next word to present, or detect that none is left
    pub fn select_next(&mut self, source: &Source, progress: &ProgressRecord) -> Selection {
        if self.is_completed() {
            return Selection::Completed;
        }
        self.state = SelectorState::Selecting;

        let picked = match self.policy {
            SelectionPolicy::Random => self.pick_random(source, progress),
            SelectionPolicy::Sequential => pick_sequential(source, progress),
            SelectionPolicy::SkippedLast => pick_skipped_last(source, progress),
        };

        match picked {
            Some(position) => {
                let entry = source.words[position].clone();
                log::debug!(
                    "Selected '{}' (position {}) from '{}'",
                    entry.term,
                    position,
                    source.name
                );
                self.state = SelectorState::Presenting(entry.clone());
                Selection::Word { entry, position }
            }
            None => {
                log::debug!("No unlearned words left in '{}'", source.name);
                self.state = SelectorState::Completed;
                Selection::Completed
            }
        }
    }

    fn pick_random(&mut self, source: &Source, progress: &ProgressRecord) -> Option<usize> {
        let available: Vec<usize> = source
            .words
            .iter()
            .enumerate()
            .filter(|(_, w)| !progress.learned.contains(&w.key()))
            .map(|(i, _)| i)
            .collect();

        if available.is_empty() {
            return None;
        }
        Some(available[self.indices.pick(available.len())])
    }
}

/// First unlearned word in stored order
fn pick_sequential(source: &Source, progress: &ProgressRecord) -> Option<usize> {
    source
        .words
        .iter()
        .position(|w| !progress.learned.contains(&w.key()))
}

/// First unlearned word in stored order; skipped words only when nothing else is left
fn pick_skipped_last(source: &Source, progress: &ProgressRecord) -> Option<usize> {
    let mut first_skipped = None;
    for (position, word) in source.words.iter().enumerate() {
        let key = word.key();
        if progress.learned.contains(&key) {
            continue;
        }
        if !progress.skipped.contains(&key) {
            return Some(position);
        }
        first_skipped.get_or_insert(position);
    }
    first_skipped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> Source {
        Source::new("Colors", vec![WordEntry::new("red"), WordEntry::new("blue")])
    }

    fn term(selection: &Selection) -> &str {
        &selection.word().expect("expected a word").term
    }

    #[test]
    fn test_random_returns_the_other_word_after_learning() {
        let source = colors();
        let mut progress = ProgressRecord::default();
        let mut selector = WordSelector::new(
            SelectionPolicy::Random,
            Box::new(RngIndexSource::seeded(7)),
        );

        let first = selector.select_next(&source, &progress);
        let first_term = term(&first).to_string();
        assert!(first_term == "red" || first_term == "blue");
        progress.learn(&first_term);

        let second = selector.select_next(&source, &progress);
        assert_ne!(term(&second), first_term);
        progress.learn(term(&second));

        assert!(selector.select_next(&source, &progress).is_completed());
        assert!(selector.is_completed());
    }

    #[test]
    fn test_random_uses_injected_indices() {
        let source = Source::new(
            "Letters",
            vec![WordEntry::new("a"), WordEntry::new("b"), WordEntry::new("c")],
        );
        let mut progress = ProgressRecord::default();
        progress.learn("a");
        let mut selector =
            WordSelector::new(SelectionPolicy::Random, Box::new(ScriptedIndices::new([1, 0, 3])));

        // available = [b, c]
        assert_eq!(term(&selector.select_next(&source, &progress)), "c");
        assert_eq!(term(&selector.select_next(&source, &progress)), "b");
        assert_eq!(term(&selector.select_next(&source, &progress)), "c");
    }

    #[test]
    fn test_random_never_completes_while_words_remain() {
        let source = colors();
        let progress = ProgressRecord::default();
        let mut selector = WordSelector::new(
            SelectionPolicy::Random,
            Box::new(RngIndexSource::seeded(42)),
        );

        for _ in 0..100 {
            assert!(!selector.select_next(&source, &progress).is_completed());
        }
    }

    #[test]
    fn test_random_ignores_skips() {
        let source = Source::new("One", vec![WordEntry::new("only")]);
        let mut progress = ProgressRecord::default();
        progress.skip("only");
        let mut selector = WordSelector::random();

        assert_eq!(term(&selector.select_next(&source, &progress)), "only");
    }

    #[test]
    fn test_sequential_first_unlearned() {
        let source = Source::new(
            "Letters",
            vec![WordEntry::new("a"), WordEntry::new("B"), WordEntry::new("c")],
        );
        let mut progress = ProgressRecord::default();
        let mut selector =
            WordSelector::new(SelectionPolicy::Sequential, Box::new(ScriptedIndices::default()));

        let selection = selector.select_next(&source, &progress);
        assert_eq!(
            selection,
            Selection::Word {
                entry: WordEntry::new("a"),
                position: 0
            }
        );

        progress.learn("a");
        progress.learn("b");
        let selection = selector.select_next(&source, &progress);
        assert_eq!(term(&selection), "c");
        assert!(matches!(selection, Selection::Word { position: 2, .. }));

        progress.learn("c");
        assert!(selector.select_next(&source, &progress).is_completed());
    }

    #[test]
    fn test_sequential_ignores_skips() {
        let source = colors();
        let mut progress = ProgressRecord::default();
        let mut selector =
            WordSelector::new(SelectionPolicy::Sequential, Box::new(ScriptedIndices::default()));

        progress.skip("red");
        assert_eq!(term(&selector.select_next(&source, &progress)), "red");

        progress.learn("red");
        assert_eq!(term(&selector.select_next(&source, &progress)), "blue");
    }

    #[test]
    fn test_skipped_last_passes_over_skipped_until_nothing_else_is_left() {
        let source = colors();
        let mut progress = ProgressRecord::default();
        let mut selector =
            WordSelector::new(SelectionPolicy::SkippedLast, Box::new(ScriptedIndices::default()));

        progress.skip("red");
        assert_eq!(term(&selector.select_next(&source, &progress)), "blue");

        progress.learn("blue");
        assert_eq!(term(&selector.select_next(&source, &progress)), "red");
    }

    #[test]
    fn test_empty_source_is_completed() {
        let source = Source::new("Empty", Vec::new());
        let progress = ProgressRecord::default();
        let mut selector = WordSelector::random();

        assert!(selector.select_next(&source, &progress).is_completed());
    }

    #[test]
    fn test_completed_is_terminal_until_reset() {
        let source = colors();
        let mut progress = ProgressRecord::default();
        progress.learn("red");
        progress.learn("blue");
        let mut selector = WordSelector::random();

        assert!(selector.select_next(&source, &progress).is_completed());

        // Progress cleared behind the selector's back: still completed
        let fresh = ProgressRecord::default();
        assert!(selector.select_next(&source, &fresh).is_completed());

        selector.reset();
        assert!(!selector.select_next(&source, &fresh).is_completed());
        assert!(selector.current_word().is_some());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("random".parse::<SelectionPolicy>(), Ok(SelectionPolicy::Random));
        assert_eq!(" Sequential ".parse::<SelectionPolicy>(), Ok(SelectionPolicy::Sequential));
        assert_eq!("skipped-last".parse::<SelectionPolicy>(), Ok(SelectionPolicy::SkippedLast));
        assert_eq!(SelectionPolicy::SkippedLast.to_string(), "skipped-last");
        assert!("shuffle".parse::<SelectionPolicy>().is_err());
    }
}
