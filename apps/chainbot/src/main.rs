//! # Chainbot
//!
//! The chainbot binary: a Twitch chat bot that imitates chat with a
//! Markov chain.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    apps/chainbot (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐     │
//! │  │   CLI       │    │   HTTP API  │    │   IRC loop       │     │
//! │  │  (clap)     │    │   (axum)    │    │  (tokio TCP)     │     │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘     │
//! │         │                  │                    │               │
//! │         └──────────────────┼────────────────────┘               │
//! │                            ▼                                    │
//! │                    ┌───────────────┐                            │
//! │                    │      Bot      │                            │
//! │                    └───────┬───────┘                            │
//! │                            ▼                                    │
//! │                    ┌───────────────┐                            │
//! │                    │ chainbot-core │                            │
//! │                    │  (THE MODEL)  │                            │
//! │                    └───────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Join chat, with the admin API on the side
//! CHAINBOT_OAUTH=oauth:... chainbot -c chainbot.toml run --http 127.0.0.1:8080
//!
//! # Try it offline
//! chainbot -c chainbot.toml repl
//! chainbot generate -f chatlog.txt -n 3 --seed 7
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // CHAINBOT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CHAINBOT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "chainbot=debug,tower_http=debug"
    } else {
        "chainbot=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    if !cli.quiet {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
   ___ _           _       _           _
  / __| |_  __ _ (_)_ _  | |__  ___  | |_
 | (__| ' \/ _` || | ' \ | '_ \/ _ \ |  _|
  \___|_||_\__,_||_|_||_||_.__/\___/  \__|

  Markov chain chat bot v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
