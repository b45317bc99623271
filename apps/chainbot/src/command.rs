//! # Admin Commands
//!
//! Parsing of chat-issued admin commands:
//!
//! ```text
//! !config    <add|remove|set> <field> <value>
//! !blacklist <add|remove|set> <field> <value>
//! ```
//!
//! The value is everything after the field, so blacklist phrases may
//! contain spaces.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static COMMAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^!(config|blacklist) (add|remove|set) (\S+) (.+)$").expect("valid command regex")
});

/// Which settings a command edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTarget {
    Config,
    Blacklist,
}

/// What a command does to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    Add,
    Remove,
    Set,
}

impl fmt::Display for CommandTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Config => "config",
            Self::Blacklist => "blacklist",
        })
    }
}

impl fmt::Display for CommandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Set => "set",
        })
    }
}

/// A parsed `!config` / `!blacklist` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCommand {
    pub target: CommandTarget,
    pub action: CommandAction,
    pub field: String,
    pub value: String,
}

impl AdminCommand {
    /// Parse a chat line. Returns `None` if it is not an admin command.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let caps = COMMAND_PATTERN.captures(line.trim_end())?;

        let target = match &caps[1] {
            "config" => CommandTarget::Config,
            _ => CommandTarget::Blacklist,
        };
        let action = match &caps[2] {
            "add" => CommandAction::Add,
            "remove" => CommandAction::Remove,
            _ => CommandAction::Set,
        };

        Some(Self {
            target,
            action,
            field: caps[3].to_string(),
            value: caps[4].trim().to_string(),
        })
    }
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} '{}' @ '{}'",
            self.action, self.target, self.value, self.field
        )
    }
}
