//! # Graph Metrics
//!
//! Informational size figures for a chain model. Nothing in the model
//! depends on them; collaborators report them in status output.

use crate::{Graph, Token};
use serde::{Deserialize, Serialize};

/// Snapshot of a graph's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphMetrics {
    /// Nodes including the two sentinels.
    pub node_count: usize,
    /// Learned words.
    pub word_count: usize,
    /// Distinct transitions.
    pub edge_count: usize,
    /// Sum of all transition weights.
    pub total_weight: u64,
    /// Number of lines learned, as seen from `Start`.
    pub sequence_count: u64,
    /// Distinct words that can open a chain.
    pub opening_words: usize,
}

impl GraphMetrics {
    /// Compute metrics for a graph.
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        let start = graph.node(&Token::Start);
        Self {
            node_count: graph.node_count(),
            word_count: graph.word_count(),
            edge_count: graph.edge_count(),
            total_weight: graph.total_weight(),
            sequence_count: start.map_or(0, |n| n.total_weight()),
            opening_words: start.map_or(0, |n| n.edge_count()),
        }
    }

    /// Average outgoing transitions per word, in thousandths.
    #[must_use]
    pub fn branching_per_thousand(&self) -> u64 {
        if self.word_count == 0 {
            return 0;
        }
        (self.edge_count as u64).saturating_mul(1000) / self.word_count as u64
    }
}
