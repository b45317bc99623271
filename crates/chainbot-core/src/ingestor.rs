//! # Ingestor Module
//!
//! Boundary between raw chat lines and the chain model.
//!
//! - Validate lines before graph mutation
//! - Split on whitespace, no normalisation or case folding
//! - Retract a line by forgetting each distinct word as often as it occurred

use crate::primitives::{MAX_LINE_LENGTH, MAX_SEQUENCE_LENGTH};
use crate::{ChainError, Graph, Token};
use std::collections::BTreeMap;

/// Line-level ingestion and retraction for a [`Graph`].
pub struct Ingestor;

impl Ingestor {
    /// Validate a line and split it into words.
    ///
    /// Rejects lines with no words, lines over `MAX_LINE_LENGTH` bytes and
    /// lines with more than `MAX_SEQUENCE_LENGTH` words.
    pub fn tokenize(line: &str) -> Result<Vec<&str>, ChainError> {
        if line.len() > MAX_LINE_LENGTH {
            return Err(ChainError::LineTooLong {
                len: line.len(),
                max: MAX_LINE_LENGTH,
            });
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Err(ChainError::EmptyInput);
        }
        if words.len() > MAX_SEQUENCE_LENGTH {
            return Err(ChainError::TooManyTokens {
                count: words.len(),
                max: MAX_SEQUENCE_LENGTH,
            });
        }

        Ok(words)
    }

    /// Learn one chat line. Returns the number of words learned.
    pub fn ingest_line(graph: &mut Graph, line: &str) -> Result<usize, ChainError> {
        let words = Self::tokenize(line)?;
        Ok(graph.ingest(words))
    }

    /// Occurrence count of each distinct word in `line`.
    #[must_use]
    pub fn word_counts(line: &str) -> BTreeMap<&str, u64> {
        let mut counts = BTreeMap::new();
        for word in line.split_whitespace() {
            let count: &mut u64 = counts.entry(word).or_default();
            *count = count.saturating_add(1);
        }
        counts
    }

    /// Unlearn a previously ingested line.
    ///
    /// Each distinct word is forgotten once with `n` equal to its number of
    /// occurrences in the line. Returns how many word nodes were deleted.
    pub fn retract_line(graph: &mut Graph, line: &str) -> usize {
        let mut deleted = 0usize;
        for (word, count) in Self::word_counts(line) {
            if graph.forget(&Token::word(word), count) {
                deleted += 1;
            }
        }
        deleted
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_any_whitespace() {
        let words = Ingestor::tokenize("  hello \t there\nfriend ").expect("tokenize");
        assert_eq!(words, vec!["hello", "there", "friend"]);
    }

    #[test]
    fn tokenize_rejects_blank_line() {
        assert_eq!(Ingestor::tokenize("   "), Err(ChainError::EmptyInput));
        assert_eq!(Ingestor::tokenize(""), Err(ChainError::EmptyInput));
    }

    #[test]
    fn tokenize_rejects_oversized_line() {
        let line = "a".repeat(MAX_LINE_LENGTH + 1);
        assert!(matches!(
            Ingestor::tokenize(&line),
            Err(ChainError::LineTooLong { .. })
        ));
    }

    #[test]
    fn tokenize_rejects_too_many_words() {
        let line = "a ".repeat(MAX_SEQUENCE_LENGTH + 1);
        assert!(matches!(
            Ingestor::tokenize(&line),
            Err(ChainError::TooManyTokens { .. })
        ));
    }

    #[test]
    fn ingest_line_learns_words() {
        let mut graph = Graph::new();
        assert_eq!(Ingestor::ingest_line(&mut graph, "hey you").expect("ingest"), 2);
        assert!(graph.contains(&Token::word("hey")));
        assert!(graph.contains(&Token::word("you")));
    }

    #[test]
    fn word_counts_counts_repeats() {
        let counts = Ingestor::word_counts("a b a c a");
        assert_eq!(counts.get("a"), Some(&3));
        assert_eq!(counts.get("b"), Some(&1));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn retract_line_undoes_ingest_line() {
        let mut graph = Graph::new();
        Ingestor::ingest_line(&mut graph, "no no no way").expect("ingest");
        Ingestor::retract_line(&mut graph, "no no no way");

        assert!(graph.is_empty());
        assert_eq!(graph.word_count(), 0);
    }

    #[test]
    fn retract_line_leaves_other_lines() {
        let mut graph = Graph::new();
        Ingestor::ingest_line(&mut graph, "good morning chat").expect("ingest");
        Ingestor::ingest_line(&mut graph, "bad words here").expect("ingest");

        Ingestor::retract_line(&mut graph, "bad words here");

        assert_eq!(graph.word_count(), 3);
        assert!(!graph.contains(&Token::word("bad")));
        assert!(graph.contains(&Token::word("morning")));
    }
}
