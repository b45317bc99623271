//! # Core Type Definitions
//!
//! This module contains the value types shared by the chain model:
//! - Token identity (`Token`), including the two sentinels
//! - Transition counts (`EdgeWeight`)
//! - Error types for raw input (`ChainError`)
//!
//! ## Guarantees
//!
//! - Tokens compare, order and hash by variant plus payload, never by identity
//! - Weights are integers with saturating arithmetic
//! - A weight of zero is never stored; it means "no edge"

use crate::primitives::{START_LABEL, STOP_LABEL};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// TOKEN
// =============================================================================

/// One atomic unit of learned text, or a sentinel marker.
///
/// `Start` and `Stop` delimit every learned sequence. They are ordinary
/// enum variants, so two `Start` values are always the same token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Token {
    /// Beginning of every learned sequence.
    Start,
    /// End of every learned sequence.
    Stop,
    /// A literal word.
    Word(String),
}

impl Token {
    /// Create a word token.
    #[must_use]
    pub fn word(s: impl Into<String>) -> Self {
        Self::Word(s.into())
    }

    /// Whether this token is `Start` or `Stop`.
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::Start | Self::Stop)
    }

    /// The word text, or `None` for sentinels.
    #[must_use]
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(w) => Some(w),
            Self::Start | Self::Stop => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str(START_LABEL),
            Self::Stop => f.write_str(STOP_LABEL),
            Self::Word(w) => f.write_str(w),
        }
    }
}

// =============================================================================
// EDGE WEIGHT
// =============================================================================

/// Number of times a transition has been learned.
///
/// Stored weights are always >= 1. Decrementing to zero or below yields
/// `None`: the edge no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeWeight(pub u64);

impl EdgeWeight {
    /// Weight of a freshly created edge.
    pub const ONE: Self = Self(1);

    /// Create an edge weight with the given value.
    #[must_use]
    pub const fn new(weight: u64) -> Self {
        Self(weight)
    }

    /// Increment by 1 using saturating arithmetic.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Subtract `n`. Returns `None` if nothing would remain.
    #[must_use]
    pub const fn decrement(self, n: u64) -> Option<Self> {
        if self.0 <= n {
            None
        } else {
            Some(Self(self.0 - n))
        }
    }

    /// Get the raw weight value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised while turning raw chat input into tokens.
///
/// Graph operations themselves are total and never return these; they only
/// guard the boundary where untrusted text enters the model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The line contained no tokens.
    #[error("Input contains no tokens")]
    EmptyInput,

    /// The line exceeds the byte limit.
    #[error("Input is {len} bytes, maximum is {max}")]
    LineTooLong { len: usize, max: usize },

    /// The line splits into too many tokens.
    #[error("Input has {count} tokens, maximum is {max}")]
    TooManyTokens { count: usize, max: usize },
}

// =============================================================================
// TESTS
// =============================================================================
