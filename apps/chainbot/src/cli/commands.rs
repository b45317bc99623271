//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use chainbot::bot::{RESET_POLL_INTERVAL, run_reset_timer};
use chainbot::{Bot, BotConfig, BotError, api, irc};
use chainbot_core::{
    DEFAULT_SEPARATOR, Graph, GraphMetrics, Ingestor,
    primitives::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH, MAX_SEQUENCE_LENGTH},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum corpus size for `generate` (100 MB).
const MAX_CORPUS_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Resolve and check an input file before reading it.
fn validate_input_file(path: &Path, max_size: u64) -> Result<PathBuf, BotError> {
    let canonical = path.canonicalize().map_err(|e| {
        BotError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(BotError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let len = std::fs::metadata(&canonical)?.len();
    if len > max_size {
        return Err(BotError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            len, max_size
        )));
    }

    Ok(canonical)
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Connect to chat and run until the login is rejected or Ctrl+C.
pub async fn cmd_run(config_path: &Path, http: Option<String>) -> Result<(), BotError> {
    let config = BotConfig::load(config_path)?;
    config.oauth_token()?;

    println!("Chainbot starting...");
    println!("  Channel:         #{}", config.channel);
    println!("  Command channel: #{}", config.command_channel());
    println!("  Server:          {}:{}", config.host, config.port);
    if let Some(addr) = &http {
        println!("  Admin API:       http://{}", addr);
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let bot = Bot::from_config(config)?.into_shared();
    tokio::spawn(run_reset_timer(bot.clone(), RESET_POLL_INTERVAL));

    if let Some(addr) = http {
        let api_bot = bot.clone();
        tokio::spawn(async move {
            if let Err(e) = api::run_server(&addr, api_bot).await {
                tracing::error!("Admin API stopped: {}", e);
            }
        });
    }

    tokio::select! {
        result = irc::run_forever(bot) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
            Ok(())
        }
    }
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Serve the admin API over a bot that is not connected to chat.
pub async fn cmd_serve(config_path: &Path, host: &str, port: u16) -> Result<(), BotError> {
    let config = BotConfig::load(config_path)?;
    let bot = Bot::from_config(config)?.into_shared();

    println!("Chainbot admin API starting...");
    println!();
    println!("Endpoints:");
    println!("  GET  /health  - Health check");
    println!("  GET  /status  - Model status");
    println!("  GET  /model   - Transition table");
    println!("  POST /chat    - Feed a chat line");
    println!("  POST /chain   - Generate a chain");
    println!("  POST /retract - Unlearn a line or author");
    println!("  POST /reset   - Reset the model");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    tokio::spawn(run_reset_timer(bot.clone(), RESET_POLL_INTERVAL));

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, bot).await
}

// =============================================================================
// REPL COMMAND
// =============================================================================

/// Offline console. Lines are chat from the first admin (or the bot itself).
///
/// `!chain`, `!showmodel`, `!showconfig` and `!showblacklist` print
/// directly; `!quit` leaves. Everything else goes through the bot and the
/// messages it would send are printed.
pub async fn cmd_repl(config_path: &Path) -> Result<(), BotError> {
    let config = BotConfig::load(config_path)?;
    let author = config
        .admins
        .first()
        .cloned()
        .unwrap_or_else(|| config.username.clone());
    let channel = config.channel.clone();
    let mut bot = Bot::from_config(config)?;

    println!("Chainbot console, chatting as '{}'. !quit to leave.", author);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        bot.tick(Instant::now());

        match line.trim() {
            "!quit" | "!exit" => break,
            "!chain" => println!("{}", bot.compose_chain()),
            "!showmodel" => print!("{}", bot.graph()),
            "!showconfig" => print!("{}", bot.config().to_redacted_toml()?),
            "!showblacklist" => println!("{}", bot.blacklist().to_pretty_json()?),
            _ => {
                let outcome = bot.process_chat(&author, &channel, &line);
                tracing::debug!(disposition = ?outcome.disposition, "Processed console line");
                for message in &outcome.outgoing {
                    println!("{}", message);
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
// GENERATE COMMAND
// =============================================================================

/// Options of the `generate` command.
#[derive(Debug)]
pub struct GenerateOptions {
    pub file: PathBuf,
    pub count: usize,
    pub seed: Option<u64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

/// Learn a corpus and print chains.
///
/// Lengths come from the flags, then the config file if it exists, then
/// the built-in defaults.
pub fn cmd_generate(
    config_path: &Path,
    json_mode: bool,
    options: &GenerateOptions,
) -> Result<(), BotError> {
    let config = if config_path.exists() {
        Some(BotConfig::load(config_path)?)
    } else {
        None
    };

    let min_length = options
        .min_length
        .or(config.as_ref().map(|c| c.min_length))
        .unwrap_or(DEFAULT_MIN_LENGTH);
    let max_length = options
        .max_length
        .or(config.as_ref().map(|c| c.max_length))
        .unwrap_or(DEFAULT_MAX_LENGTH);

    if min_length > max_length || max_length > MAX_SEQUENCE_LENGTH {
        return Err(BotError::Config(format!(
            "invalid lengths: min {} max {} (limit {})",
            min_length, max_length, MAX_SEQUENCE_LENGTH
        )));
    }

    let path = validate_input_file(&options.file, MAX_CORPUS_FILE_SIZE)?;
    let bytes = std::fs::read(&path)?;
    let text = String::from_utf8_lossy(&bytes);

    let (mut graph, learned, rejected) = learn_corpus(&text);
    tracing::info!(learned, rejected, "Learned corpus from {}", path.display());

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let chains: Vec<String> = (0..options.count)
        .map(|_| graph.generate(min_length, max_length, DEFAULT_SEPARATOR, &mut rng))
        .collect();

    if json_mode {
        let metrics = GraphMetrics::from_graph(&graph);
        let output = serde_json::json!({
            "lines_learned": learned,
            "lines_rejected": rejected,
            "metrics": metrics,
            "branching_per_thousand": metrics.branching_per_thousand(),
            "chains": chains,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    for chain in &chains {
        println!("{}", chain);
    }
    Ok(())
}

/// Learn every line of `text`. Returns the model and the counts of learned
/// and rejected lines.
fn learn_corpus(text: &str) -> (Graph, usize, usize) {
    let mut graph = Graph::new();
    let (mut learned, mut rejected) = (0usize, 0usize);
    for line in text.lines() {
        match Ingestor::ingest_line(&mut graph, line) {
            Ok(_) => learned += 1,
            Err(_) => rejected += 1,
        }
    }
    (graph, learned, rejected)
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Load config and blacklist and report what was found.
pub fn cmd_check(config_path: &Path, json_mode: bool) -> Result<(), BotError> {
    let config = BotConfig::load(config_path)?;
    let has_token = config.oauth_token().is_ok();
    let bot = Bot::from_config(config)?;
    let rules = bot.blacklist().rules();

    if json_mode {
        let output = serde_json::json!({
            "config": config_path.to_string_lossy(),
            "channel": bot.config().channel,
            "command_channel": bot.config().command_channel(),
            "oauth": has_token,
            "blacklist": {
                "full_phrases": rules.full_phrases.len(),
                "regex": rules.regex.len(),
                "words": rules.words.len(),
            },
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Configuration OK: {}", config_path.display());
    println!("  Channel:         #{}", bot.config().channel);
    println!("  Command channel: #{}", bot.config().command_channel());
    println!(
        "  OAuth token:     {}",
        if has_token { "present" } else { "MISSING" }
    );
    println!(
        "  Blacklist:       {} phrases, {} patterns, {} words",
        rules.full_phrases.len(),
        rules.regex.len(),
        rules.words.len()
    );
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
