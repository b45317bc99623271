//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        ChainRequest, ChainResponse, ChatRequest, ChatResponse, HealthResponse, ModelResponse,
        ResetResponse, RetractRequest, RetractResponse, StatusResponse,
    },
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::time::Instant;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get model and bot status.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let bot = state.bot.read().await;
    let response = StatusResponse::new(bot.metrics(), bot.cache().len(), bot.chat_counter());
    (StatusCode::OK, Json(response))
}

// =============================================================================
// MODEL HANDLER
// =============================================================================

/// Dump the transition table.
pub async fn model_handler(State(state): State<AppState>) -> impl IntoResponse {
    let bot = state.bot.read().await;
    (StatusCode::OK, Json(ModelResponse::from_graph(bot.graph())))
}

// =============================================================================
// CHAT HANDLER
// =============================================================================

/// Feed a chat line through the bot.
///
/// The bot's replies are returned, not sent to chat.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    if let Err(msg) = request.validate() {
        return (StatusCode::BAD_REQUEST, Json(ChatResponse::error(msg)));
    }

    let mut bot = state.bot.write().await;
    let channel = request
        .channel
        .clone()
        .unwrap_or_else(|| bot.config().channel.clone());
    let outcome = bot.process_chat(&request.author, &channel, &request.message);

    let replies = outcome.outgoing.iter().map(ToString::to_string).collect();
    (
        StatusCode::OK,
        Json(ChatResponse::success(outcome.disposition, replies)),
    )
}

// =============================================================================
// CHAIN HANDLER
// =============================================================================

/// Generate a chain, ignoring the cooldown.
pub async fn chain_handler(
    State(state): State<AppState>,
    Json(request): Json<ChainRequest>,
) -> impl IntoResponse {
    let mut bot = state.bot.write().await;
    let (min_default, max_default) = (bot.config().min_length, bot.config().max_length);

    match request.lengths(min_default, max_default) {
        Ok((min, max)) => {
            let chain = bot.generate(min, max);
            (StatusCode::OK, Json(ChainResponse::success(chain)))
        }
        Err(msg) => (StatusCode::BAD_REQUEST, Json(ChainResponse::error(msg))),
    }
}

// =============================================================================
// RETRACT HANDLER
// =============================================================================

/// Unlearn a line or all lines of an author.
pub async fn retract_handler(
    State(state): State<AppState>,
    Json(request): Json<RetractRequest>,
) -> impl IntoResponse {
    let mut bot = state.bot.write().await;

    let retracted = match (&request.message, &request.author) {
        (Some(message), None) => usize::from(bot.retract_line(message)),
        (None, Some(author)) => bot.retract_author(author),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RetractResponse::error(
                    "exactly one of 'message' or 'author' is required",
                )),
            );
        }
    };

    tracing::info!(retracted, "Retraction via API");
    (StatusCode::OK, Json(RetractResponse::success(retracted)))
}

// =============================================================================
// RESET HANDLER
// =============================================================================

/// Throw away the model.
pub async fn reset_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut bot = state.bot.write().await;
    let words_dropped = bot.graph().word_count();
    bot.reset_model(Instant::now());
    (
        StatusCode::OK,
        Json(ResetResponse {
            success: true,
            words_dropped,
        }),
    )
}
