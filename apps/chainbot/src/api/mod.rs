//! # Chainbot HTTP API Module
//!
//! Admin API over the running bot, built on axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Model size, cached lines, autosend counter
//! - `GET /model` - Full transition table
//! - `POST /chat` - Feed a chat line through the bot
//! - `POST /chain` - Generate a chain, no cooldown
//! - `POST /retract` - Unlearn a line or an author
//! - `POST /reset` - Throw away the model
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `CHAINBOT_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `CHAINBOT_RATE_LIMIT`: Requests per second (default: 20, 0 to disable)
//! - `CHAINBOT_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    ChainRequest, ChainResponse, ChatRequest, ChatResponse, EdgeJson, HealthResponse,
    ModelResponse, ResetResponse, RetractRequest, RetractResponse, StatusResponse,
};

use crate::bot::{Bot, SharedBot};
use crate::error::BotError;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies are single chat lines; anything bigger is refused.
const MAX_BODY_BYTES: usize = 16 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub bot: SharedBot,
}

impl AppState {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self {
            bot: bot.into_shared(),
        }
    }

    /// State over a bot that something else (the IRC loop) also drives.
    #[must_use]
    pub fn shared(bot: SharedBot) -> Self {
        Self { bot }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `CHAINBOT_CORS_ORIGINS`.
///
/// `*` allows everything, unset means localhost only, anything else is a
/// comma-separated origin list.
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("CHAINBOT_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (CHAINBOT_CORS_ORIGINS=*). Do not expose this API publicly!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in CHAINBOT_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                restricted_cors(allowed_origins)
            }
        }
        None => {
            tracing::info!("CORS: No CHAINBOT_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    restricted_cors(origins)
}

fn restricted_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): CORS, tracing, rate limiting (if
/// enabled), authentication (if configured).
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let rate_limiter = create_rate_limiter(get_rate_limit_from_env());
    match &rate_limiter {
        Some(_) => tracing::info!(
            "Rate limiting enabled: {} requests/second",
            get_rate_limit_from_env()
        ),
        None => tracing::info!("Rate limiting disabled"),
    }

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - anyone who can reach this port can reset the model. \
             Set CHAINBOT_API_KEY to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/model", get(handlers::model_handler))
        .route("/chat", post(handlers::chat_handler))
        .route("/chain", post(handlers::chain_handler))
        .route("/retract", post(handlers::retract_handler))
        .route("/reset", post(handlers::reset_handler));

    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve the admin API until the process ends.
pub async fn run_server(addr: &str, bot: SharedBot) -> Result<(), BotError> {
    let router = create_router(AppState::shared(bot));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BotError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Chainbot admin API listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| BotError::Io(format!("Server error: {}", e)))
}
