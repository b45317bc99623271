//! # IRC Module
//!
//! Twitch chat over plain IRC.
//!
//! - Classify incoming lines into [`IrcEvent`]s
//! - Render [`Outgoing`] messages with `\r\n` framing
//! - Run the connection loop: login, read, dispatch to the bot, reconnect
//!
//! The loop is the only place that touches the network. Everything the
//! bot decides comes back as a list of [`Outgoing`] messages.

use crate::bot::SharedBot;
use crate::config::BotConfig;
use crate::error::BotError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;

/// Pause before reconnecting after a lost connection.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

// =============================================================================
// LINE PATTERNS
// =============================================================================

fn pattern(src: &str) -> Regex {
    Regex::new(src).expect("valid IRC pattern")
}

static PRIVMSG: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^(?:@\S+ )?:\S*?@(\w+)\.tmi\.twitch\.tv PRIVMSG #(\w+) :(.*)$")
});
static CLEARCHAT: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^(?:@\S+ )?:tmi\.twitch\.tv CLEARCHAT #(\w+) :(\S+)$"));
static CLEARMSG: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^(?:@\S+ )?:tmi\.twitch\.tv CLEARMSG #(\w+) :(.*)$"));
static BANNED: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^(?:@\S+ )?:tmi\.twitch\.tv NOTICE #(\w+) :(\S+) is now banned from this channel\.")
});
static TIMED_OUT: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^(?:@\S+ )?:tmi\.twitch\.tv NOTICE #(\w+) :(\S+) has been timed out for .*\.")
});
static WELCOME: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^:tmi\.twitch\.tv \d{3} \S+ :Welcome, GLHF!"));
static AUTH_FAILED: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^:tmi\.twitch\.tv NOTICE \* :(?:Login authentication failed|Improperly formatted auth)")
});

// =============================================================================
// INCOMING
// =============================================================================

/// A classified line from the chat server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrcEvent {
    /// A chat message.
    Privmsg {
        author: String,
        channel: String,
        message: String,
    },
    /// All messages of a user were cleared.
    ClearChat { channel: String, user: String },
    /// A single message was deleted.
    ClearMsg { channel: String, message: String },
    Banned { channel: String, user: String },
    TimedOut { channel: String, user: String },
    /// Keepalive; must be answered with the same payload.
    Ping(String),
    Reconnect,
    Welcome,
    AuthFailed,
    Other(String),
}

impl IrcEvent {
    /// Classify one line (without its line terminator).
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(caps) = PRIVMSG.captures(line) {
            return Self::Privmsg {
                author: caps[1].to_string(),
                channel: caps[2].to_string(),
                message: caps[3].to_string(),
            };
        }
        if let Some(caps) = CLEARCHAT.captures(line) {
            return Self::ClearChat {
                channel: caps[1].to_string(),
                user: caps[2].to_string(),
            };
        }
        if let Some(caps) = CLEARMSG.captures(line) {
            return Self::ClearMsg {
                channel: caps[1].to_string(),
                message: caps[2].to_string(),
            };
        }
        if let Some(caps) = BANNED.captures(line) {
            return Self::Banned {
                channel: caps[1].to_string(),
                user: caps[2].to_string(),
            };
        }
        if let Some(caps) = TIMED_OUT.captures(line) {
            return Self::TimedOut {
                channel: caps[1].to_string(),
                user: caps[2].to_string(),
            };
        }
        if let Some(payload) = line.strip_prefix("PING ") {
            return Self::Ping(payload.trim_start_matches(':').to_string());
        }
        if line.starts_with("RECONNECT") || line.starts_with(":tmi.twitch.tv RECONNECT") {
            return Self::Reconnect;
        }
        if WELCOME.is_match(line) {
            return Self::Welcome;
        }
        if AUTH_FAILED.is_match(line) {
            return Self::AuthFailed;
        }
        Self::Other(line.to_string())
    }
}

// =============================================================================
// OUTGOING
// =============================================================================

/// A message for the chat server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Raw(String),
    Privmsg { channel: String, text: String },
}

impl Outgoing {
    #[must_use]
    pub fn privmsg(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Privmsg {
            channel: channel.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn pong(payload: &str) -> Self {
        Self::Raw(format!("PONG :{}", payload))
    }

    /// Wire form including the line terminator.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Raw(raw) => format!("{}\r\n", raw),
            Self::Privmsg { channel, text } => format!("PRIVMSG #{} :{}\r\n", channel, text),
        }
    }
}

/// Log form. Login tokens are masked.
impl fmt::Display for Outgoing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(raw) if raw.starts_with("PASS ") => f.write_str("PASS ********"),
            Self::Raw(raw) => f.write_str(raw),
            Self::Privmsg { channel, text } => write!(f, "PRIVMSG #{} :{}", channel, text),
        }
    }
}

/// Messages sent right after connecting.
pub fn login_sequence(config: &BotConfig) -> Result<Vec<Outgoing>, BotError> {
    let token = config.oauth_token()?;
    let pass = if token.starts_with("oauth:") {
        token.to_string()
    } else {
        format!("oauth:{}", token)
    };

    let mut sequence = vec![
        Outgoing::Raw("CAP REQ :twitch.tv/commands".to_string()),
        Outgoing::Raw(format!("PASS {}", pass)),
        Outgoing::Raw(format!("NICK {}", config.username)),
        Outgoing::Raw(format!("JOIN #{}", config.channel)),
    ];
    if config.command_channel() != config.channel {
        sequence.push(Outgoing::Raw(format!("JOIN #{}", config.command_channel())));
    }
    Ok(sequence)
}

// =============================================================================
// CONNECTION LOOP
// =============================================================================

/// Stay connected until a failure that is not retryable, such as a
/// rejected login.
///
/// Retryable failures are logged and followed by a reconnect after
/// [`RECONNECT_DELAY`].
pub async fn run_forever(bot: SharedBot) -> Result<(), BotError> {
    loop {
        let err = match run_session(&bot).await {
            Ok(()) => BotError::Disconnected,
            Err(e) => e,
        };

        if !err.is_retryable() {
            tracing::error!("{}; shutting down", err);
            return Err(err);
        }

        tracing::warn!("{}; reconnecting in {:?}", err, RECONNECT_DELAY);
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// One connection, from login until the first error.
async fn run_session(bot: &SharedBot) -> Result<(), BotError> {
    let (host, port, login) = {
        let bot = bot.read().await;
        let config = bot.config();
        (config.host.clone(), config.port, login_sequence(config)?)
    };

    tracing::info!("Connecting to {}:{}", host, port);
    let stream = TcpStream::connect((host.as_str(), port)).await?;
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    send_all(&mut writer, &login).await?;

    loop {
        let Some(line) = lines.next_line().await.map_err(read_error)? else {
            return Err(BotError::Disconnected);
        };
        let event = IrcEvent::parse(&line);
        let outgoing = bot.write().await.handle_event(event)?;
        send_all(&mut writer, &outgoing).await?;
    }
}

fn read_error(e: std::io::Error) -> BotError {
    if e.kind() == std::io::ErrorKind::InvalidData {
        BotError::Irc(format!("unreadable line: {}", e))
    } else {
        e.into()
    }
}

async fn send_all(writer: &mut OwnedWriteHalf, messages: &[Outgoing]) -> Result<(), BotError> {
    for message in messages {
        tracing::debug!("> {}", message);
        writer.write_all(message.render().as_bytes()).await?;
    }
    writer.flush().await?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
