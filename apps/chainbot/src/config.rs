//! # Configuration
//!
//! Bot settings loaded from a TOML file.
//!
//! ## Environment Overrides
//!
//! - `CHAINBOT_OAUTH`: chat login token, takes precedence over `oauth` in
//!   the file so the secret can stay out of it
//!
//! Admin commands can change a subset of the fields at runtime. Those
//! changes live in memory only and are gone after a restart.

use crate::command::CommandAction;
use crate::error::BotError;
use chainbot_core::primitives::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Fields that hold lists and accept `add` / `remove`.
pub const LIST_FIELDS: &[&str] = &["admins", "ignored_users"];

/// Scalar fields that accept `set`.
pub const SCALAR_FIELDS: &[&str] = &[
    "autosend",
    "command_channel",
    "cache_limit",
    "cooldown_secs",
    "reset_secs",
    "min_length",
    "max_length",
    "max_chars",
];

fn default_host() -> String {
    "irc.chat.twitch.tv".to_string()
}

const fn default_port() -> u16 {
    6667
}

const fn default_autosend() -> u32 {
    20
}

const fn default_cache_limit() -> usize {
    200
}

const fn default_cooldown_secs() -> u64 {
    30
}

const fn default_reset_secs() -> u64 {
    3600
}

const fn default_min_length() -> usize {
    DEFAULT_MIN_LENGTH
}

const fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

const fn default_max_chars() -> usize {
    450
}

/// Bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Channel the bot learns from and talks in (without `#`).
    pub channel: String,
    /// Login name of the bot account.
    pub username: String,
    /// Login token (`oauth:...`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Channel for command results and color changes. Defaults to the
    /// bot's own channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_channel: Option<String>,
    /// Send a chain automatically after this many learned lines (0 = never).
    #[serde(default = "default_autosend")]
    pub autosend: u32,
    /// How many recent lines are kept for retraction.
    #[serde(default = "default_cache_limit")]
    pub cache_limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blacklist_file: Option<PathBuf>,
    /// Minimum seconds between two chains sent on request.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default)]
    pub admins: Vec<String>,
    #[serde(default)]
    pub ignored_users: Vec<String>,
    /// Seconds between model resets.
    #[serde(default = "default_reset_secs")]
    pub reset_secs: u64,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Character budget of a sent chain.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl BotConfig {
    /// Load and validate a configuration file.
    ///
    /// A relative `blacklist_file` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, BotError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BotError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;

        let mut config = Self::from_toml_str(&text)?;

        if let (Some(file), Some(dir)) = (config.blacklist_file.as_mut(), path.parent())
            && file.is_relative()
        {
            *file = dir.join(&*file);
        }

        if let Some(token) = oauth_from_env() {
            config.oauth = Some(token);
        }

        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, BotError> {
        let mut config: Self = toml::from_str(text)
            .map_err(|e| BotError::Config(format!("Invalid TOML: {}", e)))?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn normalize(&mut self) {
        self.channel = normalize_channel(&self.channel);
        self.username = self.username.trim().to_ascii_lowercase();
        if let Some(cc) = self.command_channel.as_mut() {
            *cc = normalize_channel(cc);
        }
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.channel.is_empty() {
            return Err(BotError::Config("channel must not be empty".into()));
        }
        if self.username.is_empty() {
            return Err(BotError::Config("username must not be empty".into()));
        }
        if self.max_length == 0 {
            return Err(BotError::Config("max_length must be at least 1".into()));
        }
        if self.min_length > self.max_length {
            return Err(BotError::Config(format!(
                "min_length {} exceeds max_length {}",
                self.min_length, self.max_length
            )));
        }
        if self.cache_limit == 0 {
            return Err(BotError::Config("cache_limit must be at least 1".into()));
        }
        if self.max_chars == 0 {
            return Err(BotError::Config("max_chars must be at least 1".into()));
        }
        Ok(())
    }

    /// Channel for command results.
    #[must_use]
    pub fn command_channel(&self) -> &str {
        self.command_channel.as_deref().unwrap_or(&self.username)
    }

    /// Login token, required to connect.
    pub fn oauth_token(&self) -> Result<&str, BotError> {
        self.oauth.as_deref().filter(|t| !t.is_empty()).ok_or_else(|| {
            BotError::Config("no oauth token: set `oauth` or CHAINBOT_OAUTH".into())
        })
    }

    #[must_use]
    pub fn is_admin(&self, name: &str) -> bool {
        self.admins.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_users.iter().any(|u| u.eq_ignore_ascii_case(name))
    }

    /// TOML dump with the login token masked.
    pub fn to_redacted_toml(&self) -> Result<String, BotError> {
        let mut shown = self.clone();
        if shown.oauth.is_some() {
            shown.oauth = Some("********".to_string());
        }
        toml::to_string_pretty(&shown)
            .map_err(|e| BotError::Config(format!("Cannot render config: {}", e)))
    }

    // =========================================================================
    // RUNTIME EDITS
    // =========================================================================

    /// Apply an admin edit.
    ///
    /// List fields take `add`/`remove`, scalar fields take `set`; anything
    /// else is refused. The edit is only kept if the result still
    /// validates. Both outcomes carry a message for the command channel.
    pub fn apply_command(
        &mut self,
        action: CommandAction,
        field: &str,
        value: &str,
    ) -> Result<String, String> {
        let is_list = LIST_FIELDS.contains(&field);
        if !is_list && !SCALAR_FIELDS.contains(&field) {
            let mutable: Vec<&str> = SCALAR_FIELDS.iter().chain(LIST_FIELDS).copied().collect();
            return Err(format!(
                "Cannot change field '{}', only {:?}",
                field, mutable
            ));
        }

        match (action, is_list) {
            (CommandAction::Set, true) => {
                return Err(format!(
                    "Cannot set the field '{}', please add or remove",
                    field
                ));
            }
            (CommandAction::Add | CommandAction::Remove, false) => {
                return Err(format!(
                    "Cannot {} the field '{}', please set instead",
                    action, field
                ));
            }
            _ => {}
        }

        let mut candidate = self.clone();
        let message = if is_list {
            candidate.edit_list(action, field, value)?
        } else {
            candidate.set_scalar(field, value)?
        };

        candidate.validate().map_err(|e| e.to_string())?;
        *self = candidate;
        Ok(message)
    }

    fn edit_list(
        &mut self,
        action: CommandAction,
        field: &str,
        value: &str,
    ) -> Result<String, String> {
        let list = match field {
            "admins" => &mut self.admins,
            _ => &mut self.ignored_users,
        };
        let position = list.iter().position(|v| v.eq_ignore_ascii_case(value));

        match (action, position) {
            (CommandAction::Add, Some(_)) => {
                Err(format!("'{}' is already in '{}'", value, field))
            }
            (CommandAction::Add, None) => {
                list.push(value.to_string());
                Ok(format!("Successfully added '{}' to '{}'", value, field))
            }
            (_, Some(i)) => {
                list.remove(i);
                Ok(format!("Successfully removed '{}' from '{}'", value, field))
            }
            (_, None) => Err(format!("'{}' is not in '{}'", value, field)),
        }
    }

    fn set_scalar(&mut self, field: &str, value: &str) -> Result<String, String> {
        match field {
            "command_channel" => self.command_channel = Some(normalize_channel(value)),
            "autosend" => self.autosend = parse_number(field, value)?,
            "cache_limit" => self.cache_limit = parse_number(field, value)?,
            "cooldown_secs" => self.cooldown_secs = parse_number(field, value)?,
            "reset_secs" => self.reset_secs = parse_number(field, value)?,
            "min_length" => self.min_length = parse_number(field, value)?,
            "max_length" => self.max_length = parse_number(field, value)?,
            _ => self.max_chars = parse_number(field, value)?,
        }
        Ok(format!("Successfully set '{}' to '{}'", field, value))
    }
}

fn parse_number<T: FromStr>(field: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Field '{}' accepts only numbers, not '{}'", field, value))
}

fn normalize_channel(name: &str) -> String {
    name.trim().trim_start_matches('#').to_ascii_lowercase()
}

fn oauth_from_env() -> Option<String> {
    std::env::var("CHAINBOT_OAUTH").ok().filter(|t| !t.is_empty())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> BotConfig {
        BotConfig::from_toml_str("channel = \"#SomeStreamer\"\nusername = \"chainbot\"")
            .expect("config")
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let config = minimal();
        assert_eq!(config.channel, "somestreamer");
        assert_eq!(config.host, "irc.chat.twitch.tv");
        assert_eq!(config.port, 6667);
        assert_eq!(config.min_length, DEFAULT_MIN_LENGTH);
        assert_eq!(config.max_length, DEFAULT_MAX_LENGTH);
        assert_eq!(config.command_channel(), "chainbot");
        assert!(config.oauth_token().is_err());
    }

    #[test]
    fn rejects_inverted_lengths() {
        let result = BotConfig::from_toml_str(
            "channel = \"c\"\nusername = \"u\"\nmin_length = 9\nmax_length = 3",
        );
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn rejects_missing_channel() {
        assert!(BotConfig::from_toml_str("username = \"u\"").is_err());
    }

    #[test]
    fn admin_lookup_is_case_insensitive() {
        let mut config = minimal();
        config.admins.push("Buksss".into());
        assert!(config.is_admin("buksss"));
        assert!(!config.is_admin("someone"));
    }

    #[test]
    fn set_numeric_field() {
        let mut config = minimal();
        let msg = config
            .apply_command(CommandAction::Set, "cooldown_secs", "5")
            .expect("set");
        assert!(msg.contains("cooldown_secs"));
        assert_eq!(config.cooldown_secs, 5);
    }

    #[test]
    fn set_rejects_non_numbers() {
        let mut config = minimal();
        let err = config
            .apply_command(CommandAction::Set, "max_chars", "lots")
            .expect_err("not a number");
        assert!(err.contains("accepts only numbers"));
    }

    #[test]
    fn set_rejects_invalid_result() {
        let mut config = minimal();
        let before = config.clone();
        assert!(config.apply_command(CommandAction::Set, "min_length", "500").is_err());
        assert_eq!(config, before);
    }

    #[test]
    fn list_fields_need_add_or_remove() {
        let mut config = minimal();
        assert!(config.apply_command(CommandAction::Set, "admins", "bob").is_err());
        assert!(config.apply_command(CommandAction::Add, "admins", "bob").is_ok());
        assert!(config.apply_command(CommandAction::Add, "admins", "BOB").is_err());
        assert!(config.is_admin("bob"));
        assert!(config.apply_command(CommandAction::Remove, "admins", "bob").is_ok());
        assert!(config.apply_command(CommandAction::Remove, "admins", "bob").is_err());
    }

    #[test]
    fn immutable_fields_are_refused() {
        let mut config = minimal();
        let err = config
            .apply_command(CommandAction::Set, "oauth", "oauth:stolen")
            .expect_err("immutable");
        assert!(err.starts_with("Cannot change field 'oauth'"));
        assert!(config
            .apply_command(CommandAction::Add, "cooldown_secs", "1")
            .is_err());
    }

    #[test]
    fn redacted_dump_hides_token() {
        let mut config = minimal();
        config.oauth = Some("oauth:secret".into());
        let dump = config.to_redacted_toml().expect("render");
        assert!(!dump.contains("secret"));
        assert!(dump.contains("channel"));
    }
}
