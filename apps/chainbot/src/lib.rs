//! # chainbot
//!
//! Twitch chat bot around the chainbot-core chain model.
//!
//! - [`bot`]: chat handling, retraction, chain sending, resets
//! - [`irc`]: line classification and the connection loop
//! - [`api`]: HTTP admin API
//! - [`config`], [`blacklist`], [`command`]: settings and their runtime edits

pub mod api;
pub mod blacklist;
pub mod bot;
pub mod command;
pub mod config;
pub mod error;
pub mod irc;

pub use bot::{Bot, SharedBot};
pub use config::BotConfig;
pub use error::BotError;
