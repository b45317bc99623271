//! # Error Types
//!
//! Errors of the bot process. The chain model itself never fails; these
//! cover configuration, files, and the chat connection.

use thiserror::Error;

/// Errors that can occur in the chainbot application.
///
/// The connection loop reconnects after the variants listed in
/// [`BotError::is_retryable`] and gives up on everything else.
#[derive(Debug, Error)]
pub enum BotError {
    /// The configuration file is missing, malformed, or inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The blacklist file is malformed or holds an invalid pattern.
    #[error("Blacklist error: {0}")]
    Blacklist(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// The chat server sent a line we cannot read.
    #[error("IRC error: {0}")]
    Irc(String),

    /// The chat server asked us to reconnect.
    #[error("Reconnect requested by server")]
    Reconnect,

    /// The chat server closed the connection.
    #[error("Disconnected by host")]
    Disconnected,

    /// The chat server rejected our credentials. Not retried.
    #[error("Login authentication failed")]
    AuthenticationFailed,
}

impl From<std::io::Error> for BotError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl BotError {
    /// Whether the connection loop should try again after this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Irc(_) | Self::Reconnect | Self::Disconnected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failure_is_fatal() {
        assert!(!BotError::AuthenticationFailed.is_retryable());
        assert!(!BotError::Config("x".into()).is_retryable());
        assert!(BotError::Reconnect.is_retryable());
        assert!(BotError::Io("reset".into()).is_retryable());
        assert!(BotError::Irc("garbage".into()).is_retryable());
    }
}
