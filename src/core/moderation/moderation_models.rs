// Moderation domain models - data structures for the warning log.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer turns them into messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many warnings `/warnings` lists at most.
pub const WARNING_DISPLAY_LIMIT: u32 = 50;

/// One disciplinary action against a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRecord {
    /// Member being warned
    pub subject_id: u64,
    /// Moderator (or the bot itself) issuing the warning
    pub actor_id: u64,
    pub reason: String,
    pub time: DateTime<Utc>,
}

impl WarningRecord {
    /// Create a warning timestamped now.
    pub fn new(subject_id: u64, actor_id: u64, reason: impl Into<String>) -> Self {
        Self {
            subject_id,
            actor_id,
            reason: reason.into(),
            time: Utc::now(),
        }
    }
}

/// Warnings shown for a member plus their lifetime total.
#[derive(Debug, Clone)]
pub struct WarningSummary {
    pub member_id: u64,
    pub total: u64,
    /// Newest first, at most `WARNING_DISPLAY_LIMIT` entries.
    pub shown: Vec<WarningRecord>,
}

impl WarningSummary {
    /// Whether older warnings were left out of `shown`.
    pub fn truncated(&self) -> bool {
        self.total > u64::from(WARNING_DISPLAY_LIMIT)
    }
}
