//! Integration tests for loading configuration and blacklist files.

#![allow(clippy::unwrap_used, clippy::panic)]

use chainbot::bot::{Bot, Disposition};
use chainbot::config::BotConfig;
use chainbot::error::BotError;
use std::path::Path;
use std::sync::Mutex;

/// Serializes tests that read or write CHAINBOT_OAUTH.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_resolves_blacklist_next_to_config() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "blacklist.json", r#"{"words": ["forbidden"]}"#);
    let config_path = write(
        dir.path(),
        "chainbot.toml",
        r#"
channel = "streamer"
username = "chainbot"
blacklist_file = "blacklist.json"
autosend = 0
"#,
    );

    let config = BotConfig::load(&config_path).unwrap();
    assert_eq!(
        config.blacklist_file.as_deref(),
        Some(dir.path().join("blacklist.json").as_path())
    );

    let mut bot = Bot::from_config(config).unwrap();
    let outcome = bot.process_chat("viewer", "streamer", "a forbidden word");
    assert_eq!(outcome.disposition, Disposition::Blacklisted);
}

#[test]
fn test_blacklist_command_persists_to_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let blacklist_path = write(dir.path(), "blacklist.json", "{}");
    let config_path = write(
        dir.path(),
        "chainbot.toml",
        r#"
channel = "streamer"
username = "chainbot"
admins = ["mod"]
blacklist_file = "blacklist.json"
"#,
    );

    let mut bot = Bot::from_config(BotConfig::load(&config_path).unwrap()).unwrap();
    bot.process_chat("mod", "streamer", "!blacklist add full_phrases buy now");

    let saved = std::fs::read_to_string(&blacklist_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(json["full_phrases"][0], "buy now");
}

#[test]
fn test_missing_config_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = BotConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(BotError::Config(_))));
}

#[test]
fn test_missing_blacklist_file_fails_bot_creation() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let config_path = write(
        dir.path(),
        "chainbot.toml",
        "channel = \"c\"\nusername = \"u\"\nblacklist_file = \"nope.json\"",
    );

    let config = BotConfig::load(&config_path).unwrap();
    assert!(matches!(
        Bot::from_config(config),
        Err(BotError::Blacklist(_))
    ));
}

#[test]
fn test_oauth_env_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let config_path = write(
        dir.path(),
        "chainbot.toml",
        "channel = \"c\"\nusername = \"u\"\noauth = \"oauth:from_file\"",
    );

    // SAFETY: Tests touching the environment run under ENV_MUTEX.
    unsafe { std::env::set_var("CHAINBOT_OAUTH", "oauth:from_env") };
    let config = BotConfig::load(&config_path).unwrap();
    // SAFETY: as above.
    unsafe { std::env::remove_var("CHAINBOT_OAUTH") };

    assert_eq!(config.oauth_token().unwrap(), "oauth:from_env");

    let config = BotConfig::load(&config_path).unwrap();
    assert_eq!(config.oauth_token().unwrap(), "oauth:from_file");
}
