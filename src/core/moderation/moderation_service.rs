// Moderation service - core business logic for the warning log and the
// administrable banned word list.
//
// This service handles:
// - Recording warnings (from automod or moderators)
// - Listing and clearing a member's warnings
// - Adding/removing banned words used by the content filter
//
// NO Discord dependencies here - just pure domain logic.

use super::moderation_models::{WarningRecord, WarningSummary, WARNING_DISPLAY_LIMIT};
use crate::core::automod::{normalize, AutomodError, BannedWordSource};
use async_trait::async_trait;
use thiserror::Error;

/// Discord rejects messages longer than this.
const MAX_MESSAGE_LEN: usize = 2000;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("'{0}' contains no letters, so it could never match anything")]
    InvalidWord(String),
}

impl From<AutomodError> for ModerationError {
    fn from(err: AutomodError) -> Self {
        ModerationError::StorageError(err.to_string())
    }
}

// ============================================================================
// STORAGE TRAITS (PORTS)
// ============================================================================

/// Trait for persisting the warning log.
#[async_trait]
pub trait WarningStore: Send + Sync {
    async fn add_warning(&self, guild_id: u64, record: &WarningRecord)
        -> Result<(), ModerationError>;

    /// Most recent warnings for a member, newest first.
    async fn recent_warnings(
        &self,
        guild_id: u64,
        member_id: u64,
        limit: u32,
    ) -> Result<Vec<WarningRecord>, ModerationError>;

    async fn count_warnings(&self, guild_id: u64, member_id: u64) -> Result<u64, ModerationError>;

    /// Delete every warning for a member. Returns how many were removed.
    async fn clear_warnings(&self, guild_id: u64, member_id: u64) -> Result<u64, ModerationError>;
}

/// Write side of the banned word list.
#[async_trait]
pub trait BannedWordStore: BannedWordSource {
    /// Returns `false` if the word was already stored.
    async fn add_word(&self, word: &str) -> Result<bool, ModerationError>;

    /// Returns `false` if the word was not stored.
    async fn remove_word(&self, word: &str) -> Result<bool, ModerationError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ModerationService<S: WarningStore + BannedWordStore> {
    store: S,
}

impl<S: WarningStore + BannedWordStore> ModerationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn record_warning(
        &self,
        guild_id: u64,
        record: &WarningRecord,
    ) -> Result<(), ModerationError> {
        self.store.add_warning(guild_id, record).await?;
        tracing::info!(
            guild_id,
            user_id = record.subject_id,
            actor_id = record.actor_id,
            reason = %record.reason,
            "Warning recorded"
        );
        Ok(())
    }

    /// Record a warning issued by automod. A storage failure is logged and
    /// reported as `false` so the Discord side can still act on the violation.
    pub async fn record_automod_warning(&self, guild_id: u64, record: &WarningRecord) -> bool {
        match self.record_warning(guild_id, record).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    guild_id,
                    user_id = record.subject_id,
                    "Failed to record automod warning: {}",
                    e
                );
                false
            }
        }
    }

    /// Latest warnings (at most `WARNING_DISPLAY_LIMIT`) and the lifetime total.
    pub async fn warning_summary(
        &self,
        guild_id: u64,
        member_id: u64,
    ) -> Result<WarningSummary, ModerationError> {
        let shown = self
            .store
            .recent_warnings(guild_id, member_id, WARNING_DISPLAY_LIMIT)
            .await?;
        let total = self.store.count_warnings(guild_id, member_id).await?;

        Ok(WarningSummary {
            member_id,
            total,
            shown,
        })
    }

    pub async fn clear_warnings(
        &self,
        guild_id: u64,
        member_id: u64,
    ) -> Result<u64, ModerationError> {
        let cleared = self.store.clear_warnings(guild_id, member_id).await?;
        tracing::info!(guild_id, user_id = member_id, cleared, "Warnings cleared");
        Ok(cleared)
    }

    /// Add a banned word. Words are stored trimmed and lower-cased.
    pub async fn add_banned_word(&self, word: &str) -> Result<bool, ModerationError> {
        let word = Self::clean_word(word)?;
        self.store.add_word(&word).await
    }

    pub async fn remove_banned_word(&self, word: &str) -> Result<bool, ModerationError> {
        let word = word.trim().to_lowercase();
        self.store.remove_word(&word).await
    }

    pub async fn banned_words(&self) -> Result<Vec<String>, ModerationError> {
        Ok(self.store.list_all().await?)
    }

    fn clean_word(word: &str) -> Result<String, ModerationError> {
        let word = word.trim().to_lowercase();
        if normalize(&word).is_empty() {
            return Err(ModerationError::InvalidWord(word));
        }
        Ok(word)
    }
}

/// Render a warning summary as a chat message.
///
/// Lines that would push the message over Discord's length limit are
/// dropped and replaced by a short note.
pub fn format_warning_summary(member_mention: &str, summary: &WarningSummary) -> String {
    let shown_note = if summary.truncated() {
        format!(" (showing at most {} latest)", WARNING_DISPLAY_LIMIT)
    } else {
        String::new()
    };
    let mut message = format!(
        "{} has {} total warnings{}: ",
        member_mention, summary.total, shown_note
    );

    if summary.shown.is_empty() {
        message.push_str("\n- none :)");
        return message;
    }

    let overflow_note = "\n- …";
    for (idx, warning) in summary.shown.iter().enumerate() {
        let line = format!("\n- <t:{}> {}", warning.time.timestamp(), warning.reason);
        let is_last = idx + 1 == summary.shown.len();
        let reserved = if is_last { 0 } else { overflow_note.chars().count() };

        if message.chars().count() + line.chars().count() + reserved > MAX_MESSAGE_LEN {
            message.push_str(overflow_note);
            break;
        }
        message.push_str(&line);
    }

    message
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use dashmap::DashMap;
    use std::sync::Mutex;

    /// In-memory store for testing
    struct MockModerationStore {
        warnings: DashMap<(u64, u64), Vec<WarningRecord>>,
        words: Mutex<Vec<String>>,
        read_only: bool,
    }

    impl MockModerationStore {
        fn new() -> Self {
            Self {
                warnings: DashMap::new(),
                words: Mutex::new(Vec::new()),
                read_only: false,
            }
        }

        fn read_only() -> Self {
            Self {
                read_only: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl WarningStore for MockModerationStore {
        async fn add_warning(
            &self,
            guild_id: u64,
            record: &WarningRecord,
        ) -> Result<(), ModerationError> {
            if self.read_only {
                return Err(ModerationError::StorageError(
                    "attempt to write a readonly database".into(),
                ));
            }
            self.warnings
                .entry((guild_id, record.subject_id))
                .or_default()
                .push(record.clone());
            Ok(())
        }

        async fn recent_warnings(
            &self,
            guild_id: u64,
            member_id: u64,
            limit: u32,
        ) -> Result<Vec<WarningRecord>, ModerationError> {
            let mut records = self
                .warnings
                .get(&(guild_id, member_id))
                .map(|w| w.clone())
                .unwrap_or_default();
            records.sort_by(|a, b| b.time.cmp(&a.time));
            records.truncate(limit as usize);
            Ok(records)
        }

        async fn count_warnings(
            &self,
            guild_id: u64,
            member_id: u64,
        ) -> Result<u64, ModerationError> {
            Ok(self
                .warnings
                .get(&(guild_id, member_id))
                .map(|w| w.len() as u64)
                .unwrap_or(0))
        }

        async fn clear_warnings(
            &self,
            guild_id: u64,
            member_id: u64,
        ) -> Result<u64, ModerationError> {
            Ok(self
                .warnings
                .remove(&(guild_id, member_id))
                .map(|(_, w)| w.len() as u64)
                .unwrap_or(0))
        }
    }

    #[async_trait]
    impl BannedWordSource for MockModerationStore {
        async fn list_all(&self) -> Result<Vec<String>, AutomodError> {
            Ok(self.words.lock().unwrap().clone())
        }
    }

    #[async_trait]
    impl BannedWordStore for MockModerationStore {
        async fn add_word(&self, word: &str) -> Result<bool, ModerationError> {
            let mut words = self.words.lock().unwrap();
            if words.iter().any(|w| w == word) {
                return Ok(false);
            }
            words.push(word.to_string());
            Ok(true)
        }

        async fn remove_word(&self, word: &str) -> Result<bool, ModerationError> {
            let mut words = self.words.lock().unwrap();
            let before = words.len();
            words.retain(|w| w != word);
            Ok(words.len() != before)
        }
    }

    fn warning_at(subject_id: u64, reason: &str, minutes_ago: i64) -> WarningRecord {
        WarningRecord {
            subject_id,
            actor_id: 1,
            reason: reason.to_string(),
            time: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_summary_is_newest_first_and_capped() {
        let service = ModerationService::new(MockModerationStore::new());

        for i in 0..60 {
            service
                .record_warning(10, &warning_at(5, &format!("warning {}", i), i))
                .await
                .unwrap();
        }

        let summary = service.warning_summary(10, 5).await.unwrap();
        assert_eq!(summary.total, 60);
        assert_eq!(summary.shown.len(), 50);
        assert_eq!(summary.shown[0].reason, "warning 0");
        assert!(summary.truncated());
    }

    #[tokio::test]
    async fn test_warnings_are_scoped_per_guild() {
        let service = ModerationService::new(MockModerationStore::new());
        service
            .record_warning(1, &WarningRecord::new(5, 1, "spam"))
            .await
            .unwrap();

        let other_guild = service.warning_summary(2, 5).await.unwrap();
        assert_eq!(other_guild.total, 0);
        assert!(other_guild.shown.is_empty());
    }

    #[tokio::test]
    async fn test_clear_warnings_reports_count() {
        let service = ModerationService::new(MockModerationStore::new());
        for _ in 0..3 {
            service
                .record_warning(1, &WarningRecord::new(5, 1, "spam"))
                .await
                .unwrap();
        }

        assert_eq!(service.clear_warnings(1, 5).await.unwrap(), 3);
        assert_eq!(service.clear_warnings(1, 5).await.unwrap(), 0);
        assert_eq!(service.warning_summary(1, 5).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_banned_words_are_cleaned_and_deduplicated() {
        let service = ModerationService::new(MockModerationStore::new());

        assert!(service.add_banned_word("  Frog ").await.unwrap());
        assert!(!service.add_banned_word("frog").await.unwrap());
        assert_eq!(service.banned_words().await.unwrap(), vec!["frog"]);

        assert!(service.remove_banned_word("FROG").await.unwrap());
        assert!(!service.remove_banned_word("frog").await.unwrap());
        assert!(service.banned_words().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_banned_word_without_letters_is_rejected() {
        let service = ModerationService::new(MockModerationStore::new());
        let result = service.add_banned_word("1234").await;
        assert!(matches!(result, Err(ModerationError::InvalidWord(_))));
    }

    #[test]
    fn test_format_empty_summary() {
        let summary = WarningSummary {
            member_id: 5,
            total: 0,
            shown: vec![],
        };
        assert_eq!(
            format_warning_summary("<@5>", &summary),
            "<@5> has 0 total warnings: \n- none :)"
        );
    }

    #[test]
    fn test_format_summary_lists_reasons() {
        let warning = warning_at(5, "Sending inappropriate messages (Automod)", 0);
        let ts = warning.time.timestamp();
        let summary = WarningSummary {
            member_id: 5,
            total: 1,
            shown: vec![warning],
        };
        assert_eq!(
            format_warning_summary("<@5>", &summary),
            format!(
                "<@5> has 1 total warnings: \n- <t:{}> Sending inappropriate messages (Automod)",
                ts
            )
        );
    }

    #[tokio::test]
    async fn test_automod_warning_is_recorded() {
        let service = ModerationService::new(MockModerationStore::new());
        let warning = WarningRecord::new(5, 999, "Sending inappropriate messages (Automod)");

        assert!(service.record_automod_warning(1, &warning).await);
        assert_eq!(service.warning_summary(1, 5).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_automod_warning_storage_failure_is_not_an_error() {
        let service = ModerationService::new(MockModerationStore::read_only());
        let warning = WarningRecord::new(5, 999, "Sending inappropriate messages (Automod)");

        assert!(!service.record_automod_warning(1, &warning).await);
        assert!(service.record_warning(1, &warning).await.is_err());
    }

    #[test]
    fn test_format_summary_marks_truncation_and_fits_limit() {
        let long_reason = "x".repeat(200);
        let summary = WarningSummary {
            member_id: 5,
            total: 75,
            shown: (0..WARNING_DISPLAY_LIMIT as i64)
                .map(|i| warning_at(5, &long_reason, i))
                .collect(),
        };

        let message = format_warning_summary("<@5>", &summary);
        assert!(message.contains(&format!(
            "(showing at most {} latest)",
            WARNING_DISPLAY_LIMIT
        )));
        assert!(message.chars().count() <= MAX_MESSAGE_LEN);
        assert!(message.ends_with("\n- …"));
    }
}
