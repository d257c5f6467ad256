// Content filter - core business logic for automod.
//
// Decides whether a piece of text contains a banned word. The banned word
// list is the static list from the bot configuration plus the dynamic list
// administrators maintain in storage. The dynamic list is re-read on every
// call so edits take effect immediately.
//
// NO Discord dependencies here - just pure domain logic.

use super::automod_models::{
    fold_lookalikes, has_letters, normalize, Outcome, MESSAGE_WARNING_REASON, MODERATED_NICKNAME,
    NICKNAME_WARNING_REASON,
};
use crate::core::moderation::WarningRecord;
use async_trait::async_trait;
use regex::RegexBuilder;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum AutomodError {
    #[error("Banned word storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Escaped literals always compile, so this signals a bug.
    #[error("Invalid banned word pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Read side of the administrable banned word list.
#[async_trait]
pub trait BannedWordSource: Send + Sync {
    /// Every stored banned word.
    async fn list_all(&self) -> Result<Vec<String>, AutomodError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ContentFilter<S: BannedWordSource> {
    static_words: Vec<String>,
    source: S,
    /// Identity recorded as the issuer of automod warnings (the bot user).
    actor_id: u64,
}

impl<S: BannedWordSource> ContentFilter<S> {
    pub fn new(static_words: Vec<String>, source: S, actor_id: u64) -> Self {
        Self {
            static_words,
            source,
            actor_id,
        }
    }

    /// Check whether `input` contains any banned word.
    ///
    /// Both sides are upper-cased and normalized before matching, and
    /// matching is case-insensitive substring search. Upper-casing first
    /// makes `ß` and `SS` reach the same letters. Returns `false` when the
    /// effective word list is empty or the input has no letters.
    pub async fn is_blacklisted(&self, input: &str) -> Result<bool, AutomodError> {
        let dynamic_words = self.source.list_all().await?;

        let alternatives: Vec<String> = self
            .static_words
            .iter()
            .chain(dynamic_words.iter())
            .map(|word| normalize(&word.to_uppercase()))
            .filter(|word| !word.is_empty())
            .map(|word| regex::escape(&word))
            .collect();

        let input = input.to_uppercase();
        if alternatives.is_empty() || !has_letters(&input) {
            return Ok(false);
        }

        let pattern = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()?;

        Ok(pattern.is_match(&normalize(&input)) || pattern.is_match(&fold_lookalikes(&input)))
    }

    /// Classify a message sent by `author_id`.
    pub async fn enforce_on_message(
        &self,
        author_id: u64,
        content: &str,
    ) -> Result<Outcome, AutomodError> {
        if !self.is_blacklisted(&content.to_lowercase()).await? {
            return Ok(Outcome::Clean);
        }

        tracing::info!(user_id = author_id, "Automod flagged message");

        Ok(Outcome::Violation {
            warning: WarningRecord::new(author_id, self.actor_id, MESSAGE_WARNING_REASON),
        })
    }

    /// Classify the display name of `member_id`.
    pub async fn enforce_on_nickname(
        &self,
        member_id: u64,
        display_name: &str,
    ) -> Result<Outcome, AutomodError> {
        if !self.is_blacklisted(&display_name.to_lowercase()).await? {
            return Ok(Outcome::Clean);
        }

        tracing::info!(user_id = member_id, "Automod flagged display name");

        Ok(Outcome::ViolationRename {
            warning: WarningRecord::new(member_id, self.actor_id, NICKNAME_WARNING_REASON),
            replacement: MODERATED_NICKNAME.to_string(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
