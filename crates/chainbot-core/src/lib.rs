//! # chainbot-core
//!
//! The chain model for chainbot - THE MODEL.
//!
//! A mutable weighted-transition graph over tokens. It learns short
//! sequences (one chat line at a time), can unlearn specific tokens again
//! when a line is retracted, and generates new sequences by weighted
//! random walk between the `Start` and `Stop` sentinels.
//!
//! ## Architectural Constraints
//!
//! - The [`Graph`] is the sole owner of every [`Node`]; nodes refer to their
//!   successors by [`Token`] only, so the whole model is dropped in one move
//! - Every mutating call returns with the graph invariants restored
//!   (positive weights, no dangling edges, no dead non-sentinel nodes)
//! - No async, no I/O, no internal locking; randomness is injected
//! - No persistence: a reset is `Graph::new()`

// =============================================================================
// MODULES
// =============================================================================

pub mod generator;
pub mod graph;
pub mod ingestor;
pub mod metrics;
pub mod node;
pub mod primitives;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{ChainError, EdgeWeight, Token};

// =============================================================================
// RE-EXPORTS: Model
// =============================================================================

pub use graph::Graph;
pub use ingestor::Ingestor;
pub use metrics::GraphMetrics;
pub use node::Node;
pub use primitives::{DEFAULT_SEPARATOR, EMPTY_MODEL_FALLBACK};
