// SQLite-backed moderation store.
//
// Tables:
// - warnings: every warning ever issued, scoped per guild
// - automod_words: banned words added at runtime with /automod add

use crate::core::automod::{AutomodError, BannedWordSource};
use crate::core::moderation::{BannedWordStore, ModerationError, WarningRecord, WarningStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

#[derive(Clone)]
pub struct SqliteModerationStore {
    pool: Pool<Sqlite>,
}

impl SqliteModerationStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Create the tables if they don't exist yet.
    pub async fn migrate(&self) -> Result<(), ModerationError> {
        // Warning time is unix millis so ORDER BY is chronological.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS warnings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                member_id INTEGER NOT NULL,
                actor_id INTEGER NOT NULL,
                reason TEXT NOT NULL,
                time INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_warnings_guild_member
                ON warnings(guild_id, member_id, time);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS automod_words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word TEXT UNIQUE NOT NULL,
                time INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl WarningStore for SqliteModerationStore {
    async fn add_warning(
        &self,
        guild_id: u64,
        record: &WarningRecord,
    ) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            INSERT INTO warnings (guild_id, member_id, actor_id, reason, time)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(guild_id as i64)
        .bind(record.subject_id as i64)
        .bind(record.actor_id as i64)
        .bind(&record.reason)
        .bind(record.time.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;
        Ok(())
    }

    async fn recent_warnings(
        &self,
        guild_id: u64,
        member_id: u64,
        limit: u32,
    ) -> Result<Vec<WarningRecord>, ModerationError> {
        let rows = sqlx::query(
            r#"
            SELECT member_id, actor_id, reason, time
            FROM warnings
            WHERE guild_id = ? AND member_id = ?
            ORDER BY time DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(guild_id as i64)
        .bind(member_id as i64)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        let warnings = rows
            .into_iter()
            .map(|row| {
                let millis: i64 = row.get("time");
                WarningRecord {
                    subject_id: row.get::<i64, _>("member_id") as u64,
                    actor_id: row.get::<i64, _>("actor_id") as u64,
                    reason: row.get("reason"),
                    time: DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now),
                }
            })
            .collect();
        Ok(warnings)
    }

    async fn count_warnings(&self, guild_id: u64, member_id: u64) -> Result<u64, ModerationError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM warnings WHERE guild_id = ? AND member_id = ?",
        )
        .bind(guild_id as i64)
        .bind(member_id as i64)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(row.get::<i64, _>("total") as u64)
    }

    async fn clear_warnings(&self, guild_id: u64, member_id: u64) -> Result<u64, ModerationError> {
        let result = sqlx::query("DELETE FROM warnings WHERE guild_id = ? AND member_id = ?")
            .bind(guild_id as i64)
            .bind(member_id as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl BannedWordSource for SqliteModerationStore {
    async fn list_all(&self) -> Result<Vec<String>, AutomodError> {
        let rows = sqlx::query("SELECT word FROM automod_words ORDER BY word")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AutomodError::StorageUnavailable(e.to_string()))?;

        Ok(rows.into_iter().map(|row| row.get("word")).collect())
    }
}

#[async_trait]
impl BannedWordStore for SqliteModerationStore {
    async fn add_word(&self, word: &str) -> Result<bool, ModerationError> {
        let result = sqlx::query(
            r#"
            INSERT INTO automod_words (word, time)
            VALUES (?, ?)
            ON CONFLICT(word) DO NOTHING
            "#,
        )
        .bind(word)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_word(&self, word: &str) -> Result<bool, ModerationError> {
        let result = sqlx::query("DELETE FROM automod_words WHERE word = ?")
            .bind(word)
            .execute(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn store() -> SqliteModerationStore {
        // One connection, otherwise every connection gets its own in-memory db.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteModerationStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    fn warning_at(member_id: u64, reason: &str, minutes_ago: i64) -> WarningRecord {
        let mut record = WarningRecord::new(member_id, 1, reason);
        record.time = Utc::now() - Duration::minutes(minutes_ago);
        record
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let store = store().await;
        store.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn test_recent_warnings_newest_first_with_limit() {
        let store = store().await;
        store.add_warning(10, &warning_at(5, "old", 30)).await.unwrap();
        store.add_warning(10, &warning_at(5, "newest", 1)).await.unwrap();
        store.add_warning(10, &warning_at(5, "middle", 10)).await.unwrap();

        let warnings = store.recent_warnings(10, 5, 2).await.unwrap();
        let reasons: Vec<_> = warnings.iter().map(|w| w.reason.as_str()).collect();
        assert_eq!(reasons, vec!["newest", "middle"]);
        assert_eq!(warnings[0].subject_id, 5);
        assert_eq!(warnings[0].actor_id, 1);
        assert_eq!(store.count_warnings(10, 5).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_time_survives_storage_at_millisecond_precision() {
        let store = store().await;
        let record = warning_at(5, "r", 3);
        store.add_warning(10, &record).await.unwrap();

        let loaded = store.recent_warnings(10, 5, 1).await.unwrap();
        assert_eq!(
            loaded[0].time.timestamp_millis(),
            record.time.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn test_warnings_are_guild_scoped_and_clearable() {
        let store = store().await;
        store.add_warning(10, &warning_at(5, "a", 1)).await.unwrap();
        store.add_warning(10, &warning_at(5, "b", 2)).await.unwrap();
        store.add_warning(20, &warning_at(5, "c", 3)).await.unwrap();

        assert_eq!(store.clear_warnings(10, 5).await.unwrap(), 2);
        assert_eq!(store.count_warnings(10, 5).await.unwrap(), 0);
        assert_eq!(store.count_warnings(20, 5).await.unwrap(), 1);
        assert_eq!(store.clear_warnings(10, 5).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_banned_words_are_unique() {
        let store = store().await;
        assert!(store.add_word("frog").await.unwrap());
        assert!(!store.add_word("frog").await.unwrap());
        assert!(store.add_word("toad").await.unwrap());

        assert_eq!(store.list_all().await.unwrap(), vec!["frog", "toad"]);

        assert!(store.remove_word("frog").await.unwrap());
        assert!(!store.remove_word("frog").await.unwrap());
        assert_eq!(store.list_all().await.unwrap(), vec!["toad"]);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_unavailable() {
        let store = store().await;
        store.pool.close().await;

        assert!(matches!(
            store.list_all().await,
            Err(AutomodError::StorageUnavailable(_))
        ));
    }
}
