//! # Blacklist
//!
//! Chat lines the bot must never learn, read from a JSON file:
//!
//! ```json
//! {
//!   "full_phrases": ["buy followers"],
//!   "regex": ["https?://"],
//!   "words": ["spam"]
//! }
//! ```
//!
//! Matching is done on the lowercased line. Phrases match anywhere as
//! substrings, patterns are searched anywhere, words must equal a whole
//! whitespace-separated token.

use crate::command::CommandAction;
use crate::error::BotError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Field names accepted by `!blacklist` commands.
pub const BLACKLIST_FIELDS: &[&str] = &["full_phrases", "regex", "words"];

/// Raw blacklist rules as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistRules {
    #[serde(default)]
    pub full_phrases: Vec<String>,
    #[serde(default)]
    pub regex: Vec<String>,
    #[serde(default)]
    pub words: Vec<String>,
}

impl BlacklistRules {
    fn field_mut(&mut self, field: &str) -> Option<&mut Vec<String>> {
        match field {
            "full_phrases" => Some(&mut self.full_phrases),
            "regex" => Some(&mut self.regex),
            "words" => Some(&mut self.words),
            _ => None,
        }
    }
}

/// Which rule rejected a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlacklistMatch<'a> {
    Phrase(&'a str),
    Pattern(&'a str),
    Word(&'a str),
}

impl fmt::Display for BlacklistMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phrase(p) => write!(f, "phrase '{}'", p),
            Self::Pattern(p) => write!(f, "pattern '{}'", p),
            Self::Word(w) => write!(f, "word '{}'", w),
        }
    }
}

/// Compiled blacklist.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    rules: BlacklistRules,
    patterns: Vec<Regex>,
    path: Option<PathBuf>,
}

impl Blacklist {
    /// A blacklist that accepts everything.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile a set of rules. Fails on the first invalid pattern.
    pub fn from_rules(mut rules: BlacklistRules) -> Result<Self, BotError> {
        for phrase in &mut rules.full_phrases {
            *phrase = phrase.to_lowercase();
        }
        for word in &mut rules.words {
            *word = word.to_lowercase();
        }
        let patterns = compile(&rules.regex)?;
        Ok(Self {
            rules,
            patterns,
            path: None,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, BotError> {
        let rules: BlacklistRules = serde_json::from_str(text)
            .map_err(|e| BotError::Blacklist(format!("Invalid JSON: {}", e)))?;
        Self::from_rules(rules)
    }

    /// Load from a file and remember the path for [`Blacklist::save`].
    pub fn load(path: &Path) -> Result<Self, BotError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BotError::Blacklist(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        let mut blacklist = Self::from_json(&text)?;
        blacklist.path = Some(path.to_path_buf());
        tracing::info!(
            phrases = blacklist.rules.full_phrases.len(),
            patterns = blacklist.patterns.len(),
            words = blacklist.rules.words.len(),
            "Loaded blacklist from {}",
            path.display()
        );
        Ok(blacklist)
    }

    /// Write the rules back to the file they came from, if any.
    pub fn save(&self) -> Result<(), BotError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        std::fs::write(path, self.to_pretty_json()?).map_err(|e| {
            BotError::Blacklist(format!("Cannot write '{}': {}", path.display(), e))
        })
    }

    #[must_use]
    pub fn rules(&self) -> &BlacklistRules {
        &self.rules
    }

    pub fn to_pretty_json(&self) -> Result<String, BotError> {
        serde_json::to_string_pretty(&self.rules)
            .map_err(|e| BotError::Blacklist(format!("Cannot render blacklist: {}", e)))
    }

    /// First rule that rejects `line`, if any.
    #[must_use]
    pub fn matches(&self, line: &str) -> Option<BlacklistMatch<'_>> {
        let lowered = line.to_lowercase();

        if let Some(phrase) = self
            .rules
            .full_phrases
            .iter()
            .find(|p| lowered.contains(p.as_str()))
        {
            return Some(BlacklistMatch::Phrase(phrase.as_str()));
        }

        if let Some(pattern) = self.patterns.iter().find(|re| re.is_match(&lowered)) {
            return Some(BlacklistMatch::Pattern(pattern.as_str()));
        }

        let words: Vec<&str> = lowered.split_whitespace().collect();
        self.rules
            .words
            .iter()
            .find(|w| words.contains(&w.as_str()))
            .map(|w| BlacklistMatch::Word(w.as_str()))
    }

    #[must_use]
    pub fn is_blacklisted(&self, line: &str) -> bool {
        self.matches(line).is_some()
    }

    /// Apply an admin edit in memory.
    ///
    /// Only `add` and `remove` are accepted. A new pattern must compile.
    pub fn apply_command(
        &mut self,
        action: CommandAction,
        field: &str,
        value: &str,
    ) -> Result<String, String> {
        if action == CommandAction::Set {
            return Err(format!("Cannot {} in blacklist", action));
        }

        let mut rules = self.rules.clone();
        let Some(list) = rules.field_mut(field) else {
            return Err(format!(
                "'{}' is not a field in blacklist, only {:?}",
                field, BLACKLIST_FIELDS
            ));
        };

        let stored = if field == "regex" {
            value.to_string()
        } else {
            value.to_lowercase()
        };
        let position = list.iter().position(|v| *v == stored);

        let message = match (action, position) {
            (CommandAction::Add, Some(_)) => {
                return Err(format!("'{}' is already in field '{}'", value, field));
            }
            (CommandAction::Add, None) => {
                list.push(stored);
                format!("Successfully added '{}' to '{}'", value, field)
            }
            (_, Some(i)) => {
                list.remove(i);
                format!("Successfully removed '{}' from '{}'", value, field)
            }
            (_, None) => {
                return Err(format!(
                    "'{}' is not in field '{}' of blacklist",
                    value, field
                ));
            }
        };

        let patterns = compile(&rules.regex).map_err(|e| e.to_string())?;
        self.rules = rules;
        self.patterns = patterns;
        Ok(message)
    }
}

fn compile(sources: &[String]) -> Result<Vec<Regex>, BotError> {
    sources
        .iter()
        .map(|src| {
            Regex::new(src)
                .map_err(|e| BotError::Blacklist(format!("Invalid pattern '{}': {}", src, e)))
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Blacklist {
        Blacklist::from_json(
            r#"{"full_phrases": ["Buy Followers"], "regex": ["https?://"], "words": ["spam"]}"#,
        )
        .expect("blacklist")
    }

    #[test]
    fn phrase_matches_case_insensitively() {
        let bl = sample();
        assert_eq!(
            bl.matches("want to BUY FOLLOWERS cheap"),
            Some(BlacklistMatch::Phrase("buy followers"))
        );
    }

    #[test]
    fn pattern_is_searched_anywhere() {
        let bl = sample();
        assert!(matches!(
            bl.matches("check http://example.com"),
            Some(BlacklistMatch::Pattern(_))
        ));
    }

    #[test]
    fn words_match_whole_tokens_only() {
        let bl = sample();
        assert_eq!(bl.matches("SPAM incoming"), Some(BlacklistMatch::Word("spam")));
        assert!(!bl.is_blacklisted("spammer incoming"));
    }

    #[test]
    fn clean_line_passes() {
        assert!(!sample().is_blacklisted("hello chat"));
        assert!(!Blacklist::empty().is_blacklisted("anything at all"));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let bl = Blacklist::from_json(r#"{"words": ["x"]}"#).expect("blacklist");
        assert!(bl.rules().full_phrases.is_empty());
        assert!(bl.rules().regex.is_empty());
    }

    #[test]
    fn invalid_pattern_is_rejected_on_load() {
        let result = Blacklist::from_json(r#"{"regex": ["(unclosed"]}"#);
        assert!(matches!(result, Err(BotError::Blacklist(_))));
    }

    #[test]
    fn add_and_remove_words() {
        let mut bl = sample();
        bl.apply_command(CommandAction::Add, "words", "Kappa")
            .expect("add");
        assert!(bl.is_blacklisted("kappa"));
        assert!(bl.apply_command(CommandAction::Add, "words", "kappa").is_err());
        bl.apply_command(CommandAction::Remove, "words", "kappa")
            .expect("remove");
        assert!(!bl.is_blacklisted("kappa"));
        assert!(bl.apply_command(CommandAction::Remove, "words", "kappa").is_err());
    }

    #[test]
    fn invalid_command_pattern_leaves_rules_untouched() {
        let mut bl = sample();
        let before = bl.rules().clone();
        assert!(bl.apply_command(CommandAction::Add, "regex", "[oops").is_err());
        assert_eq!(bl.rules(), &before);
    }

    #[test]
    fn set_and_unknown_fields_are_refused() {
        let mut bl = sample();
        assert!(bl.apply_command(CommandAction::Set, "words", "x").is_err());
        let err = bl
            .apply_command(CommandAction::Add, "emotes", "x")
            .expect_err("unknown field");
        assert!(err.contains("is not a field in blacklist"));
    }

    #[test]
    fn save_writes_pretty_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("blacklist.json");
        std::fs::write(&path, r#"{"words": ["spam"]}"#).expect("write");

        let mut bl = Blacklist::load(&path).expect("load");
        bl.apply_command(CommandAction::Add, "full_phrases", "free gift")
            .expect("add");
        bl.save().expect("save");

        let reloaded = Blacklist::load(&path).expect("reload");
        assert_eq!(reloaded.rules().full_phrases, vec!["free gift".to_string()]);
        assert!(std::fs::read_to_string(&path).expect("read").contains('\n'));
    }
}
