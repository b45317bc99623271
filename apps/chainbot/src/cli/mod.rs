//! # Chainbot CLI Module
//!
//! ## Available Commands
//!
//! - `run` - Connect to chat and run the bot (default)
//! - `repl` - Offline console: type chat lines, see what the bot does
//! - `serve` - Only the HTTP admin API
//! - `generate` - Learn a text file and print chains
//! - `check` - Validate the configuration and blacklist

mod commands;

use chainbot::BotError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Chainbot - Markov chain chat bot
///
/// Learns from chat, forgets what moderators remove, and talks back.
#[derive(Parser, Debug)]
#[command(name = "chainbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "chainbot.toml")]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to chat and run the bot
    Run {
        /// Also serve the admin API on this address (e.g. 127.0.0.1:8080)
        #[arg(long)]
        http: Option<String>,
    },

    /// Offline console mode
    Repl,

    /// Serve only the HTTP admin API
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Learn a text file line by line and print chains
    Generate {
        /// Corpus file, one chat line per line
        #[arg(short, long)]
        file: PathBuf,

        /// Number of chains to print
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Minimum words per chain
        #[arg(long)]
        min_length: Option<usize>,

        /// Maximum words per chain
        #[arg(long)]
        max_length: Option<usize>,
    },

    /// Validate configuration and blacklist, then exit
    Check,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), BotError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Run { http }) => cmd_run(&cli.config, http).await,
        None => cmd_run(&cli.config, None).await,
        Some(Commands::Repl) => cmd_repl(&cli.config).await,
        Some(Commands::Serve { host, port }) => cmd_serve(&cli.config, &host, port).await,
        Some(Commands::Generate {
            file,
            count,
            seed,
            min_length,
            max_length,
        }) => cmd_generate(
            &cli.config,
            json_mode,
            &GenerateOptions {
                file,
                count,
                seed,
                min_length,
                max_length,
            },
        ),
        Some(Commands::Check) => cmd_check(&cli.config, json_mode),
    }
}
