//! # Bot
//!
//! The chat bot around one chain model.
//!
//! Learns every accepted chat line, unlearns lines again when moderators
//! remove them, answers `!chain` and `!markovbot` with a cooldown, speaks
//! on its own every `autosend` lines, and throws the model away every
//! `reset_secs`.
//!
//! The bot does no I/O of its own. Every entry point returns the messages
//! to send; the IRC loop, the REPL and the HTTP API deliver them.

use crate::blacklist::Blacklist;
use crate::command::{AdminCommand, CommandTarget};
use crate::config::BotConfig;
use crate::error::BotError;
use crate::irc::{IrcEvent, Outgoing};
use chainbot_core::{DEFAULT_SEPARATOR, Graph, GraphMetrics, Ingestor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;

/// Bot shared between the IRC loop and the HTTP API.
pub type SharedBot = Arc<RwLock<Bot>>;

/// How often the reset timer is polled.
pub const RESET_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Name colors picked at random after each requested message.
pub const COLORS: &[&str] = &[
    "Red",
    "Blue",
    "Green",
    "Firebrick",
    "Coral",
    "BlueViolet",
    "CadetBlue",
    "Chocolate",
    "DodgerBlue",
    "GoldenRod",
    "HotPink",
    "OrangeRed",
    "SeaGreen",
    "SpringGreen",
    "YellowGreen",
];

/// A learned line kept for retraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedLine {
    pub author: String,
    pub line: String,
}

/// What happened to a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Author is on the ignore list.
    Ignored,
    /// Handled as a command.
    Command,
    /// `!chain` or `!markovbot` during the cooldown.
    OnCooldown,
    Blacklisted,
    /// Empty or oversized line.
    Rejected,
    Learned,
}

/// Result of [`Bot::process_chat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    pub disposition: Disposition,
    pub outgoing: Vec<Outgoing>,
}

impl ChatOutcome {
    fn silent(disposition: Disposition) -> Self {
        Self {
            disposition,
            outgoing: Vec::new(),
        }
    }
}

/// The chat bot.
pub struct Bot {
    graph: Graph,
    rng: StdRng,
    config: BotConfig,
    blacklist: Blacklist,
    cache: VecDeque<CachedLine>,
    chat_counter: u32,
    last_send: Instant,
    last_reset: Instant,
}

impl Bot {
    /// Create a bot with an explicit random source.
    #[must_use]
    pub fn new(config: BotConfig, blacklist: Blacklist, rng: StdRng) -> Self {
        let now = Instant::now();
        Self {
            graph: Graph::new(),
            rng,
            config,
            blacklist,
            cache: VecDeque::new(),
            chat_counter: 0,
            last_send: now,
            last_reset: now,
        }
    }

    /// Create a bot from configuration, loading the blacklist file if one
    /// is configured.
    pub fn from_config(config: BotConfig) -> Result<Self, BotError> {
        let blacklist = match &config.blacklist_file {
            Some(path) => Blacklist::load(path)?,
            None => Blacklist::empty(),
        };
        Ok(Self::new(config, blacklist, StdRng::from_entropy()))
    }

    #[must_use]
    pub fn into_shared(self) -> SharedBot {
        Arc::new(RwLock::new(self))
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    #[must_use]
    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[must_use]
    pub fn metrics(&self) -> GraphMetrics {
        GraphMetrics::from_graph(&self.graph)
    }

    #[must_use]
    pub fn cache(&self) -> &VecDeque<CachedLine> {
        &self.cache
    }

    #[must_use]
    pub fn chat_counter(&self) -> u32 {
        self.chat_counter
    }

    // =========================================================================
    // IRC DISPATCH
    // =========================================================================

    /// React to one server event.
    ///
    /// `Reconnect` and `AuthFailed` come back as errors so the connection
    /// loop can drop the connection.
    pub fn handle_event(&mut self, event: IrcEvent) -> Result<Vec<Outgoing>, BotError> {
        match event {
            IrcEvent::Privmsg {
                author,
                channel,
                message,
            } => {
                tracing::debug!("#{} {}: {}", channel, author, message);
                Ok(self.process_chat(&author, &channel, &message).outgoing)
            }
            IrcEvent::ClearChat { channel, user }
            | IrcEvent::Banned { channel, user }
            | IrcEvent::TimedOut { channel, user } => {
                let retracted = self.retract_author(&user);
                tracing::debug!(
                    "{} cleared, timed out, or banned in #{}; retracted {} lines",
                    user,
                    channel,
                    retracted
                );
                Ok(Vec::new())
            }
            IrcEvent::ClearMsg { channel, message } => {
                tracing::debug!("Message '{}' cleared in #{}", message, channel);
                self.retract_line(&message);
                Ok(Vec::new())
            }
            IrcEvent::Ping(payload) => {
                tracing::debug!("Received PING");
                Ok(vec![Outgoing::pong(&payload)])
            }
            IrcEvent::Reconnect => Err(BotError::Reconnect),
            IrcEvent::AuthFailed => Err(BotError::AuthenticationFailed),
            IrcEvent::Welcome => {
                tracing::info!("Connected successfully");
                Ok(Vec::new())
            }
            IrcEvent::Other(line) => {
                tracing::debug!("Received miscellaneous line: {}", line);
                Ok(Vec::new())
            }
        }
    }

    // =========================================================================
    // CHAT
    // =========================================================================

    /// Handle one chat line.
    pub fn process_chat(&mut self, author: &str, channel: &str, line: &str) -> ChatOutcome {
        if self.config.is_ignored(author) {
            return ChatOutcome::silent(Disposition::Ignored);
        }

        if let Some(command) = AdminCommand::parse(line) {
            let result = if self.config.is_admin(author) {
                self.handle_command(&command)
            } else {
                format!(
                    "Non admin {} tried to {} {} with '{}' @ '{}'",
                    author, command.action, command.target, command.value, command.field
                )
            };
            tracing::info!(%author, %command, %result, "Admin command");
            return ChatOutcome {
                disposition: Disposition::Command,
                outgoing: vec![Outgoing::privmsg(self.config.command_channel(), result)],
            };
        }

        let now = Instant::now();

        if line.trim_end() == "!reset" {
            if self.config.is_admin(author) {
                tracing::info!("Admin {} reset the model", author);
                self.reset_model(now);
            } else {
                tracing::warn!("Non-admin {} attempted to reset the model", author);
            }
            return ChatOutcome::silent(Disposition::Command);
        }

        if line.starts_with("!markovbot") {
            if !self.cooldown_elapsed(now) {
                tracing::debug!("!markovbot on cooldown");
                return ChatOutcome::silent(Disposition::OnCooldown);
            }
            self.last_send = now;
            let info = format!(
                "{}, chainbot imitates chat with a Markov chain. Type !chain to hear it, \
                 or wait for it to speak on its own",
                author
            );
            return ChatOutcome {
                disposition: Disposition::Command,
                outgoing: vec![
                    Outgoing::privmsg(self.config.channel.clone(), info),
                    self.change_color(),
                ],
            };
        }

        if line.starts_with("!chain") {
            if !self.cooldown_elapsed(now) {
                tracing::debug!("!chain on cooldown");
                return ChatOutcome::silent(Disposition::OnCooldown);
            }
            return ChatOutcome {
                disposition: Disposition::Command,
                outgoing: vec![self.send_chain(now), self.change_color()],
            };
        }

        if let Some(hit) = self.blacklist.matches(line) {
            tracing::debug!("#{} line contained blacklisted {}: {}", channel, hit, line);
            return ChatOutcome::silent(Disposition::Blacklisted);
        }

        if let Err(e) = Ingestor::ingest_line(&mut self.graph, line) {
            tracing::debug!("Rejected line from {}: {}", author, e);
            return ChatOutcome::silent(Disposition::Rejected);
        }

        self.cache.push_back(CachedLine {
            author: author.to_string(),
            line: line.to_string(),
        });
        self.trim_cache();
        self.chat_counter = self.chat_counter.saturating_add(1);

        let mut outgoing = Vec::new();
        if self.config.autosend > 0 && self.chat_counter >= self.config.autosend {
            outgoing.push(self.send_chain(now));
        }

        ChatOutcome {
            disposition: Disposition::Learned,
            outgoing,
        }
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_send)
            >= Duration::from_secs(self.config.cooldown_secs)
    }

    fn trim_cache(&mut self) {
        while self.cache.len() > self.config.cache_limit {
            self.cache.pop_front();
        }
    }

    fn change_color(&mut self) -> Outgoing {
        let color = COLORS.choose(&mut self.rng).copied().unwrap_or("Blue");
        Outgoing::privmsg(self.config.command_channel(), format!("/color {}", color))
    }

    // =========================================================================
    // RETRACTION
    // =========================================================================

    /// Unlearn one cached occurrence of `line`.
    ///
    /// Lines that are not in the cache were never learned or have aged out
    /// and are left alone. Returns whether a line was retracted.
    pub fn retract_line(&mut self, line: &str) -> bool {
        let Some(index) = self.cache.iter().position(|c| c.line == line) else {
            return false;
        };
        self.cache.remove(index);
        let deleted = Ingestor::retract_line(&mut self.graph, line);
        tracing::debug!("Retracted '{}' ({} words deleted)", line, deleted);
        true
    }

    /// Unlearn every cached line of `author`. Returns how many were retracted.
    pub fn retract_author(&mut self, author: &str) -> usize {
        let mut retracted = 0usize;
        let mut kept = VecDeque::with_capacity(self.cache.len());
        for cached in std::mem::take(&mut self.cache) {
            if cached.author.eq_ignore_ascii_case(author) {
                Ingestor::retract_line(&mut self.graph, &cached.line);
                retracted += 1;
            } else {
                kept.push_back(cached);
            }
        }
        self.cache = kept;
        retracted
    }

    /// Unlearn every cached line the current blacklist rejects.
    fn purge_blacklisted(&mut self) -> usize {
        let mut purged = 0usize;
        let mut kept = VecDeque::with_capacity(self.cache.len());
        for cached in std::mem::take(&mut self.cache) {
            if self.blacklist.is_blacklisted(&cached.line) {
                Ingestor::retract_line(&mut self.graph, &cached.line);
                purged += 1;
            } else {
                kept.push_back(cached);
            }
        }
        self.cache = kept;
        purged
    }

    // =========================================================================
    // GENERATION
    // =========================================================================

    /// Compose a chain and address it to the main channel.
    ///
    /// Restarts the autosend counter and the cooldown.
    fn send_chain(&mut self, now: Instant) -> Outgoing {
        self.chat_counter = 0;
        self.last_send = now;
        let chain = self.compose_chain();
        tracing::info!("Created chain: {}", chain);
        Outgoing::privmsg(self.config.channel.clone(), chain)
    }

    /// A chain with the configured lengths, cut to `max_chars`.
    pub fn compose_chain(&mut self) -> String {
        let (min, max) = (self.config.min_length, self.config.max_length);
        let chain = self.generate(min, max);
        truncate_chain(&chain, self.config.max_chars)
    }

    /// Raw generation, no cooldown and no truncation.
    pub fn generate(&mut self, min_length: usize, max_length: usize) -> String {
        self.graph
            .generate(min_length, max_length, DEFAULT_SEPARATOR, &mut self.rng)
    }

    // =========================================================================
    // RESET
    // =========================================================================

    /// Replace the model with an empty one.
    ///
    /// The retraction cache is cleared with it, since its lines are no
    /// longer part of the model.
    pub fn reset_model(&mut self, now: Instant) {
        tracing::info!(
            words = self.graph.word_count(),
            "Resetting the model"
        );
        self.graph = Graph::new();
        self.cache.clear();
        self.last_reset = now;
    }

    /// Poll the reset timer. Returns `true` if the model was reset.
    ///
    /// A `reset_secs` of zero disables periodic resets.
    pub fn tick(&mut self, now: Instant) -> bool {
        let period = self.config.reset_secs;
        if period == 0
            || now.saturating_duration_since(self.last_reset) < Duration::from_secs(period)
        {
            return false;
        }
        self.reset_model(now);
        true
    }

    // =========================================================================
    // ADMIN COMMANDS
    // =========================================================================

    /// Apply an admin command and describe the result.
    fn handle_command(&mut self, command: &AdminCommand) -> String {
        let result = match command.target {
            CommandTarget::Config => {
                let result =
                    self.config
                        .apply_command(command.action, &command.field, &command.value);
                if result.is_ok() {
                    self.trim_cache();
                }
                result
            }
            CommandTarget::Blacklist => {
                let result =
                    self.blacklist
                        .apply_command(command.action, &command.field, &command.value);
                if result.is_ok() {
                    if let Err(e) = self.blacklist.save() {
                        tracing::warn!("Blacklist changed in memory only: {}", e);
                    }
                    let purged = self.purge_blacklisted();
                    if purged > 0 {
                        tracing::info!("Retracted {} cached lines now blacklisted", purged);
                    }
                }
                result
            }
        };

        match result {
            Ok(message) | Err(message) => message,
        }
    }
}

/// Poll a shared bot's reset timer every `interval`. Never returns; drop or
/// abort the task to stop it.
pub async fn run_reset_timer(bot: SharedBot, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        bot.write().await.tick(Instant::now());
    }
}

/// Cut a chain to at most `max_chars` characters without splitting a word.
///
/// A chain that fits is returned whole. Otherwise the cut moves back to the
/// last whitespace; a single word longer than the budget is cut hard.
#[must_use]
pub fn truncate_chain(chain: &str, max_chars: usize) -> String {
    if chain.chars().count() <= max_chars {
        return chain.to_string();
    }

    let cut: String = chain.chars().take(max_chars).collect();
    let at_boundary = chain
        .chars()
        .nth(max_chars)
        .is_some_and(char::is_whitespace);

    let kept = if at_boundary {
        cut.as_str()
    } else {
        match cut.rfind(char::is_whitespace) {
            Some(i) => &cut[..i],
            None => cut.as_str(),
        }
    };
    kept.trim_end().to_string()
}

// =============================================================================
// TESTS
// =============================================================================
