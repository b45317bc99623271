//! Integration tests for the chainbot admin API.
//!
//! Uses axum-test to exercise the router without binding a port.

// Holding the env MutexGuard across awaits is deliberate: tests that touch
// CHAINBOT_* variables must not interleave.
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum::http::HeaderValue;
use axum_test::TestServer;
use chainbot::api::{
    AppState, ChainResponse, ChatResponse, HealthResponse, ModelResponse, ResetResponse,
    RetractResponse, StatusResponse, create_router,
};
use chainbot::blacklist::Blacklist;
use chainbot::bot::{Bot, Disposition};
use chainbot::config::BotConfig;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use std::sync::Mutex;

/// Serializes tests because they modify env vars.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Holds the env mutex and clears the API variables on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under ENV_MUTEX, so no concurrent env access.
        unsafe {
            std::env::remove_var("CHAINBOT_API_KEY");
            std::env::remove_var("CHAINBOT_RATE_LIMIT");
        }
    }
}

fn lock_env() -> TestGuard {
    let guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under ENV_MUTEX, so no concurrent env access.
    unsafe {
        std::env::remove_var("CHAINBOT_API_KEY");
        std::env::remove_var("CHAINBOT_RATE_LIMIT");
    }
    TestGuard { _guard: guard }
}

fn test_bot() -> Bot {
    let config = BotConfig::from_toml_str(
        r#"
channel = "streamer"
username = "chainbot"
admins = ["mod"]
autosend = 0
cooldown_secs = 0
min_length = 1
max_length = 20
"#,
    )
    .unwrap();
    Bot::new(config, Blacklist::empty(), StdRng::seed_from_u64(99))
}

fn create_test_server() -> (TestServer, TestGuard) {
    let guard = lock_env();
    let router = create_router(AppState::new(test_bot()));
    (TestServer::new(router).unwrap(), guard)
}

async fn say(server: &TestServer, author: &str, message: &str) -> ChatResponse {
    server
        .post("/chat")
        .json(&json!({ "author": author, "message": message }))
        .await
        .json()
}

// =============================================================================
// HEALTH / STATUS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_status_empty_model() {
    let (server, _guard) = create_test_server();

    let status: StatusResponse = server.get("/status").await.json();

    assert_eq!(status.node_count, 2);
    assert_eq!(status.word_count, 0);
    assert_eq!(status.edge_count, 0);
    assert_eq!(status.branching_per_thousand, 0);
    assert_eq!(status.cached_lines, 0);
}

// =============================================================================
// CHAT
// =============================================================================

#[tokio::test]
async fn test_chat_learns_line() {
    let (server, _guard) = create_test_server();

    let chat = say(&server, "viewer", "hello there chat").await;
    assert!(chat.success);
    assert_eq!(chat.disposition, Some(Disposition::Learned));
    assert!(chat.replies.is_empty());

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.word_count, 3);
    assert_eq!(status.sequence_count, 1);
    // Start->hello, hello->there, there->chat, chat->Stop over 3 words
    assert_eq!(status.branching_per_thousand, 1333);
    assert_eq!(status.cached_lines, 1);
    assert_eq!(status.chat_counter, 1);
}

#[tokio::test]
async fn test_chat_chain_command_replies() {
    let (server, _guard) = create_test_server();

    say(&server, "viewer", "only words").await;
    let chat = say(&server, "viewer", "!chain").await;

    assert_eq!(chat.disposition, Some(Disposition::Command));
    assert_eq!(chat.replies[0], "PRIVMSG #streamer :only words");
    assert!(chat.replies[1].starts_with("PRIVMSG #chainbot :/color "));
}

#[tokio::test]
async fn test_chat_admin_command() {
    let (server, _guard) = create_test_server();

    let chat = say(&server, "mod", "!blacklist add words spam").await;
    assert_eq!(
        chat.replies,
        vec!["PRIVMSG #chainbot :Successfully added 'spam' to 'words'".to_string()]
    );

    let blocked = say(&server, "viewer", "spam spam spam").await;
    assert_eq!(blocked.disposition, Some(Disposition::Blacklisted));
}

#[tokio::test]
async fn test_chat_rejects_empty_author() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/chat")
        .json(&json!({ "author": "  ", "message": "hi" }))
        .await;

    response.assert_status_bad_request();
    let chat: ChatResponse = response.json();
    assert!(!chat.success);
    assert!(chat.error.is_some());
}

// =============================================================================
// CHAIN
// =============================================================================

#[tokio::test]
async fn test_chain_on_empty_model_returns_fallback() {
    let (server, _guard) = create_test_server();

    let chain: ChainResponse = server.post("/chain").json(&json!({})).await.json();

    assert!(chain.success);
    assert_eq!(
        chain.chain.as_deref(),
        Some(chainbot_core::EMPTY_MODEL_FALLBACK)
    );
}

#[tokio::test]
async fn test_chain_respects_max_length() {
    let (server, _guard) = create_test_server();

    say(&server, "a", "w w w w w w w w w w").await;
    let chain: ChainResponse = server
        .post("/chain")
        .json(&json!({ "min_length": 1, "max_length": 3 }))
        .await
        .json();

    let text = chain.chain.unwrap();
    assert!(text.split_whitespace().count() <= 3);
}

#[tokio::test]
async fn test_chain_rejects_inverted_lengths() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/chain")
        .json(&json!({ "min_length": 9, "max_length": 2 }))
        .await;

    response.assert_status_bad_request();
    let chain: ChainResponse = response.json();
    assert!(!chain.success);
}

// =============================================================================
// RETRACT / RESET / MODEL
// =============================================================================

#[tokio::test]
async fn test_retract_message() {
    let (server, _guard) = create_test_server();

    say(&server, "viewer", "remove this line").await;
    let retract: RetractResponse = server
        .post("/retract")
        .json(&json!({ "message": "remove this line" }))
        .await
        .json();
    assert_eq!(retract.retracted, 1);

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.word_count, 0);
    assert_eq!(status.edge_count, 0);
}

#[tokio::test]
async fn test_retract_author() {
    let (server, _guard) = create_test_server();

    say(&server, "troll", "first bad").await;
    say(&server, "viewer", "nice play").await;
    say(&server, "Troll", "second worse").await;

    let retract: RetractResponse = server
        .post("/retract")
        .json(&json!({ "author": "TROLL" }))
        .await
        .json();
    assert_eq!(retract.retracted, 2);

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.word_count, 2);
    assert_eq!(status.cached_lines, 1);
}

#[tokio::test]
async fn test_retract_requires_one_target() {
    let (server, _guard) = create_test_server();

    server
        .post("/retract")
        .json(&json!({}))
        .await
        .assert_status_bad_request();
    server
        .post("/retract")
        .json(&json!({ "message": "x", "author": "y" }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_reset_clears_model() {
    let (server, _guard) = create_test_server();

    say(&server, "viewer", "soon forgotten").await;
    let reset: ResetResponse = server.post("/reset").await.json();
    assert!(reset.success);
    assert_eq!(reset.words_dropped, 2);

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.word_count, 0);
    assert_eq!(status.cached_lines, 0);
}

#[tokio::test]
async fn test_model_lists_edges_with_sentinel_labels() {
    let (server, _guard) = create_test_server();

    say(&server, "viewer", "hi").await;
    let model: ModelResponse = server.get("/model").await.json();

    let pairs: Vec<(&str, &str, u64)> = model
        .edges
        .iter()
        .map(|e| (e.from.as_str(), e.to.as_str(), e.weight))
        .collect();
    assert_eq!(pairs, vec![("<START>", "hi", 1), ("hi", "<STOP>", 1)]);
}

// =============================================================================
// AUTH / RATE LIMIT
// =============================================================================

#[tokio::test]
async fn test_auth_required_when_key_set() {
    let guard = lock_env();
    // SAFETY: Tests run sequentially under ENV_MUTEX, so no concurrent env access.
    unsafe { std::env::set_var("CHAINBOT_API_KEY", "sekrit") };
    let server = TestServer::new(create_router(AppState::new(test_bot()))).unwrap();

    server.get("/status").await.assert_status_unauthorized();
    server.get("/health").await.assert_status_ok();

    let ok = server
        .get("/status")
        .add_header(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer sekrit"),
        )
        .await;
    ok.assert_status_ok();

    let wrong = server
        .get("/status")
        .add_header(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer sekrix"),
        )
        .await;
    wrong.assert_status_unauthorized();

    drop(guard);
}

#[tokio::test]
async fn test_rate_limit_rejects_burst() {
    let guard = lock_env();
    // SAFETY: Tests run sequentially under ENV_MUTEX, so no concurrent env access.
    unsafe { std::env::set_var("CHAINBOT_RATE_LIMIT", "1") };
    let server = TestServer::new(create_router(AppState::new(test_bot()))).unwrap();

    server.get("/health").await.assert_status_ok();
    server
        .get("/health")
        .await
        .assert_status(axum::http::StatusCode::TOO_MANY_REQUESTS);

    drop(guard);
}
