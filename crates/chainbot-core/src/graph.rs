//! # Graph
//!
//! The token-keyed arena that owns every [`Node`] of the chain model.
//!
//! Edges are `Token -> weight` entries inside nodes, so the graph is the
//! only owner in the structure and cycles between words cost nothing.
//! All maps are `BTreeMap` for deterministic iteration.
//!
//! ## Invariants (restored before every mutating call returns)
//!
//! - every stored edge weight is >= 1
//! - no non-sentinel node has zero outgoing weight
//! - every edge target has a node in the graph
//! - `Start` and `Stop` always exist

use crate::{EdgeWeight, Node, Token};
use std::collections::BTreeMap;
use std::fmt;

/// The chain model.
///
/// A fresh graph holds only the two sentinels. Resetting the model means
/// dropping the graph and constructing a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    /// token -> node, sentinels included
    nodes: BTreeMap<Token, Node>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create an empty model containing only `Start` and `Stop`.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(Token::Start, Node::new());
        nodes.insert(Token::Stop, Node::new());
        Self { nodes }
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Learn one sequence as the path `Start -> w1 -> ... -> wk -> Stop`.
    ///
    /// Missing nodes are created on first reference. Repeating a sequence
    /// strengthens the same edges. An empty sequence learns `Start -> Stop`.
    /// Returns the number of words learned.
    pub fn ingest<I>(&mut self, words: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut previous = Token::Start;
        let mut learned = 0usize;

        for word in words {
            let token = Token::Word(word.into());
            self.nodes.entry(token.clone()).or_default();
            self.link(&previous, &token);
            previous = token;
            learned += 1;
        }

        self.link(&previous, &Token::Stop);
        learned
    }

    /// Undo `n` learned occurrences of `token`.
    ///
    /// Every node's edge toward `token` loses `n`. If no incoming weight is
    /// left anywhere, `token`'s node is deleted together with its own
    /// outgoing edges. Predecessors left without any outgoing edge are then
    /// pruned. Returns `true` if `token`'s node was deleted.
    ///
    /// No-op for sentinels, for `n == 0`, and for unknown tokens.
    pub fn forget(&mut self, token: &Token, n: u64) -> bool {
        if token.is_sentinel() || n == 0 || !self.nodes.contains_key(token) {
            return false;
        }

        let remaining = self
            .nodes
            .values_mut()
            .fold(0u64, |acc, node| acc.saturating_add(node.decrement(token, n)));

        let deleted = remaining == 0 && self.nodes.remove(token).is_some();
        self.prune();
        deleted
    }

    /// Delete `token`'s node and every edge pointing at it, whatever the
    /// weights. Returns `true` if a node was removed.
    ///
    /// No-op for sentinels and for unknown tokens.
    pub fn remove(&mut self, token: &Token) -> bool {
        if token.is_sentinel() || !self.detach(token) {
            return false;
        }
        self.prune();
        true
    }

    /// Delete every non-sentinel node without outgoing edges.
    ///
    /// Removing a node can strand a predecessor whose only edge pointed at
    /// it, so this repeats until nothing changes. Returns the number of
    /// nodes deleted.
    pub fn prune(&mut self) -> usize {
        let mut pruned = 0usize;
        loop {
            let dead: Vec<Token> = self
                .nodes
                .iter()
                .filter(|(token, node)| !token.is_sentinel() && node.is_empty())
                .map(|(token, _)| token.clone())
                .collect();

            if dead.is_empty() {
                return pruned;
            }

            for token in &dead {
                if self.detach(token) {
                    pruned += 1;
                }
            }
        }
    }

    /// Increment `from -> to`. `from` must already have a node.
    fn link(&mut self, from: &Token, to: &Token) {
        if let Some(node) = self.nodes.get_mut(from) {
            node.increment(to);
        }
    }

    /// Remove a node and all edges into it, without pruning.
    fn detach(&mut self, token: &Token) -> bool {
        if self.nodes.remove(token).is_none() {
            return false;
        }
        for node in self.nodes.values_mut() {
            node.delete_edge(token);
        }
        true
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    /// Whether `token` has a node.
    #[must_use]
    pub fn contains(&self, token: &Token) -> bool {
        self.nodes.contains_key(token)
    }

    /// The node for `token`, if any.
    #[must_use]
    pub fn node(&self, token: &Token) -> Option<&Node> {
        self.nodes.get(token)
    }

    /// Weight of `from -> to`, if that edge exists.
    #[must_use]
    pub fn edge_weight(&self, from: &Token, to: &Token) -> Option<EdgeWeight> {
        self.nodes.get(from)?.weight_to(to)
    }

    /// Total weight of all edges pointing at `token`.
    #[must_use]
    pub fn incoming_weight(&self, token: &Token) -> u64 {
        self.nodes
            .values()
            .filter_map(|node| node.weight_to(token))
            .fold(0u64, |acc, w| acc.saturating_add(w.value()))
    }

    /// Number of nodes, sentinels included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of learned words (nodes minus the two sentinels).
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.nodes.keys().filter(|t| !t.is_sentinel()).count()
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Node::edge_count).sum()
    }

    /// Sum of every edge weight in the graph.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.nodes
            .values()
            .fold(0u64, |acc, node| acc.saturating_add(node.total_weight()))
    }

    /// Whether nothing has been learned (`Start` has no successors).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.get(&Token::Start).is_none_or(Node::is_empty)
    }

    /// All nodes in deterministic order.
    pub fn nodes(&self) -> impl Iterator<Item = (&Token, &Node)> {
        self.nodes.iter()
    }

    /// All edges as `(from, to, weight)` in deterministic order.
    pub fn edges(&self) -> impl Iterator<Item = (&Token, &Token, EdgeWeight)> + '_ {
        self.nodes
            .iter()
            .flat_map(|(from, node)| node.successors().map(move |(to, w)| (from, to, w)))
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (token, node) in &self.nodes {
            writeln!(f, "({}) {}", token, node)?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
