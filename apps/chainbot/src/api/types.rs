//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use crate::bot::Disposition;
use chainbot_core::{
    Graph, GraphMetrics,
    primitives::{MAX_LINE_LENGTH, MAX_SEQUENCE_LENGTH},
};
use serde::{Deserialize, Serialize};

/// Longest accepted author name, in bytes.
pub const MAX_AUTHOR_LENGTH: usize = 64;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Model and bot status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub node_count: usize,
    pub word_count: usize,
    pub edge_count: usize,
    pub total_weight: u64,
    pub sequence_count: u64,
    /// Average outgoing transitions per word, in thousandths.
    pub branching_per_thousand: u64,
    pub cached_lines: usize,
    pub chat_counter: u32,
}

impl StatusResponse {
    pub fn new(metrics: GraphMetrics, cached_lines: usize, chat_counter: u32) -> Self {
        Self {
            node_count: metrics.node_count,
            word_count: metrics.word_count,
            edge_count: metrics.edge_count,
            total_weight: metrics.total_weight,
            sequence_count: metrics.sequence_count,
            branching_per_thousand: metrics.branching_per_thousand(),
            cached_lines,
            chat_counter,
        }
    }
}

// =============================================================================
// CHAT REQUEST/RESPONSE
// =============================================================================

/// A chat line to feed through the bot as if it came from IRC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub author: String,
    pub message: String,
    /// Defaults to the bot's main channel.
    #[serde(default)]
    pub channel: Option<String>,
}

impl ChatRequest {
    /// Check field sizes before the line reaches the bot.
    pub fn validate(&self) -> Result<(), String> {
        if self.author.trim().is_empty() {
            return Err("author must not be empty".to_string());
        }
        if self.author.len() > MAX_AUTHOR_LENGTH {
            return Err(format!(
                "author length {} exceeds maximum {} bytes",
                self.author.len(),
                MAX_AUTHOR_LENGTH
            ));
        }
        if self.message.len() > MAX_LINE_LENGTH {
            return Err(format!(
                "message length {} exceeds maximum {} bytes",
                self.message.len(),
                MAX_LINE_LENGTH
            ));
        }
        Ok(())
    }
}

/// What the bot did with a chat line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub disposition: Option<Disposition>,
    /// Messages the bot would have sent, in IRC log form.
    pub replies: Vec<String>,
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn success(disposition: Disposition, replies: Vec<String>) -> Self {
        Self {
            success: true,
            disposition: Some(disposition),
            replies,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            disposition: None,
            replies: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// CHAIN REQUEST/RESPONSE
// =============================================================================

/// Generation request. Missing lengths fall back to the bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainRequest {
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl ChainRequest {
    /// Resolve the lengths against configured defaults.
    pub fn lengths(&self, min_default: usize, max_default: usize) -> Result<(usize, usize), String> {
        let min = self.min_length.unwrap_or(min_default);
        let max = self.max_length.unwrap_or(max_default);
        if max > MAX_SEQUENCE_LENGTH {
            return Err(format!(
                "max_length {} exceeds maximum {}",
                max, MAX_SEQUENCE_LENGTH
            ));
        }
        if min > max {
            return Err(format!("min_length {} exceeds max_length {}", min, max));
        }
        Ok((min, max))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainResponse {
    pub success: bool,
    pub chain: Option<String>,
    pub error: Option<String>,
}

impl ChainResponse {
    pub fn success(chain: String) -> Self {
        Self {
            success: true,
            chain: Some(chain),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            chain: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// RETRACT REQUEST/RESPONSE
// =============================================================================

/// Retract one line, or every cached line of one author.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetractRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetractResponse {
    pub success: bool,
    pub retracted: usize,
    pub error: Option<String>,
}

impl RetractResponse {
    pub fn success(retracted: usize) -> Self {
        Self {
            success: true,
            retracted,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            retracted: 0,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// RESET RESPONSE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
    /// Words the model held before the reset.
    pub words_dropped: usize,
}

// =============================================================================
// MODEL RESPONSE
// =============================================================================

/// Edge JSON representation. Sentinels are rendered by their labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeJson {
    pub from: String,
    pub to: String,
    pub weight: u64,
}

/// Full transition table, in model order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    pub edges: Vec<EdgeJson>,
}

impl ModelResponse {
    pub fn from_graph(graph: &Graph) -> Self {
        let edges = graph
            .edges()
            .map(|(from, to, weight)| EdgeJson {
                from: from.to_string(),
                to: to.to_string(),
                weight: weight.value(),
            })
            .collect();
        Self { edges }
    }
}
