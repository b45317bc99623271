//! # Node
//!
//! One token's outgoing transition distribution.
//!
//! A node never points at another node directly. Successors are held by
//! [`Token`] and resolved through the owning [`Graph`](crate::Graph).

use crate::{EdgeWeight, Token};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Successor weights of a single token.
///
/// Uses `BTreeMap` so sampling walks the successors in a fixed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// successor -> weight (always >= 1)
    edges: BTreeMap<Token, EdgeWeight>,
}

impl Node {
    /// Create a node with no outgoing edges.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add 1 to the edge toward `successor`, creating it at weight 1.
    pub fn increment(&mut self, successor: &Token) {
        match self.edges.get_mut(successor) {
            Some(weight) => *weight = weight.increment(),
            None => {
                self.edges.insert(successor.clone(), EdgeWeight::ONE);
            }
        }
    }

    /// Subtract `n` from the edge toward `successor`.
    ///
    /// The edge is deleted once nothing remains. Returns the remaining
    /// weight, 0 if the edge was deleted or never existed.
    pub fn decrement(&mut self, successor: &Token, n: u64) -> u64 {
        let Some(weight) = self.edges.get_mut(successor) else {
            return 0;
        };

        match weight.decrement(n) {
            Some(remaining) => {
                *weight = remaining;
                remaining.value()
            }
            None => {
                self.edges.remove(successor);
                0
            }
        }
    }

    /// Remove the edge toward `successor` regardless of its weight.
    pub fn delete_edge(&mut self, successor: &Token) -> Option<EdgeWeight> {
        self.edges.remove(successor)
    }

    /// Weight of the edge toward `successor`, if any.
    #[must_use]
    pub fn weight_to(&self, successor: &Token) -> Option<EdgeWeight> {
        self.edges.get(successor).copied()
    }

    /// Sum of all outgoing edge weights.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.edges
            .values()
            .fold(0u64, |acc, w| acc.saturating_add(w.value()))
    }

    /// Number of distinct successors.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether this node has no outgoing edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Outgoing edges in sampling order.
    pub fn successors(&self) -> impl Iterator<Item = (&Token, EdgeWeight)> + '_ {
        self.edges.iter().map(|(t, w)| (t, *w))
    }

    /// Draw a successor with probability `weight / total_weight`.
    ///
    /// `[0, total)` is split into consecutive runs, one per successor in
    /// iteration order, each as long as its weight; a uniform draw picks the
    /// run it lands in. Returns `None` when there are no outgoing edges.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Token> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }

        let mut draw = rng.gen_range(0..total);
        for (token, weight) in &self.edges {
            if draw < weight.value() {
                return Some(token);
            }
            draw -= weight.value();
        }

        // Only reachable if the saturated total undercounts the runs.
        self.edges.keys().next_back()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (token, weight)) in self.edges.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", token, weight.value())?;
        }
        f.write_str("}")
    }
}

// =============================================================================
// TESTS
// =============================================================================
