//! # Generator
//!
//! Weighted random walk from `Start` over the learned transitions.
//!
//! ```text
//! WALK --draw--> word ---------------------------> append, WALK
//!        |
//!        +-----> Stop/none --len >= min----------> DONE
//!                          \--len <  min--> RESAMPLE from Start
//!                                             (output kept, same rule)
//! ```
//!
//! The walk also ends once `max_length` words were emitted. An early `Stop`
//! does not restart the output: the resampled word is appended to what was
//! already produced, so a long chain may read as several joined sentences.

use crate::primitives::{EMPTY_MODEL_FALLBACK, MAX_RESAMPLE_ATTEMPTS};
use crate::{Graph, Token};
use rand::Rng;

/// Outcome of one draw during the walk.
enum Transition {
    Word(String),
    Stop,
}

impl From<Option<&Token>> for Transition {
    fn from(drawn: Option<&Token>) -> Self {
        match drawn {
            Some(Token::Word(w)) => Self::Word(w.clone()),
            // Absence and sentinels all end the current sentence.
            Some(Token::Start | Token::Stop) | None => Self::Stop,
        }
    }
}

impl Graph {
    /// Generate a chain of words joined by `separator`.
    ///
    /// Returns [`EMPTY_MODEL_FALLBACK`] when nothing has been learned.
    /// Prunes dead nodes before walking. Never fails.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        min_length: usize,
        max_length: usize,
        separator: &str,
        rng: &mut R,
    ) -> String {
        match self.generate_words(min_length, max_length, rng) {
            Some(words) => words.join(separator),
            None => EMPTY_MODEL_FALLBACK.to_string(),
        }
    }

    /// Generate the chain as separate words.
    ///
    /// Returns `None` when the model is empty. The result never holds more
    /// than `max_length` words. It holds at least `min_length` words unless
    /// `max_length` is smaller or the model cannot produce a word from
    /// `Start` at all.
    pub fn generate_words<R: Rng + ?Sized>(
        &mut self,
        min_length: usize,
        max_length: usize,
        rng: &mut R,
    ) -> Option<Vec<String>> {
        if self.is_empty() {
            return None;
        }

        self.prune();
        if self.is_empty() {
            return None;
        }

        let mut output: Vec<String> = Vec::new();
        let mut current = Token::Start;

        while output.len() < max_length {
            let next = match self.draw(&current, rng) {
                Transition::Word(w) => w,
                Transition::Stop if output.len() >= min_length => break,
                Transition::Stop => match self.resample_from_start(rng) {
                    Some(w) => w,
                    None => break,
                },
            };

            current = Token::Word(next.clone());
            output.push(next);
        }

        Some(output)
    }

    /// Sample a successor of `from`; a missing node reads as `Stop`.
    fn draw<R: Rng + ?Sized>(&self, from: &Token, rng: &mut R) -> Transition {
        Transition::from(self.node(from).and_then(|node| node.sample(rng)))
    }

    /// Keep drawing from `Start` until a word comes out.
    fn resample_from_start<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        (0..MAX_RESAMPLE_ATTEMPTS).find_map(|_| match self.draw(&Token::Start, rng) {
            Transition::Word(w) => Some(w),
            Transition::Stop => None,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
