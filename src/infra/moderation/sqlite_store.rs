// SQLite-backed banned vocabulary store.
//
// One table, keyed on the lower-cased form so uniqueness holds no matter
// how a moderator cases the entry:
// - banned_words: normalized (PK), display word, word_type, note

use crate::core::moderation::{BannedWord, BannedWordStore, ModerationError};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

pub struct SqliteBannedWordStore {
    pool: Pool<Sqlite>,
}

impl SqliteBannedWordStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure the file exists if it's a file path
        let path_str = database_url.trim_start_matches("sqlite://");
        if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path_str)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        let pool = SqlitePoolOptions::new().connect(&conn_str).await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS banned_words (
                normalized TEXT PRIMARY KEY,
                word TEXT NOT NULL,
                word_type TEXT NOT NULL,
                note TEXT NOT NULL DEFAULT ''
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BannedWordStore for SqliteBannedWordStore {
    async fn list_words(&self) -> Result<Vec<BannedWord>, ModerationError> {
        let rows = sqlx::query(
            r#"
            SELECT word, word_type, note
            FROM banned_words
            ORDER BY word
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageUnavailable(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| BannedWord {
                word: row.get("word"),
                word_type: row.get("word_type"),
                note: row.get("note"),
            })
            .collect())
    }

    async fn insert_word(&self, word: BannedWord) -> Result<(), ModerationError> {
        let result = sqlx::query(
            r#"
            INSERT INTO banned_words (normalized, word, word_type, note)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(normalized) DO NOTHING
            "#,
        )
        .bind(word.normalized())
        .bind(&word.word)
        .bind(&word.word_type)
        .bind(&word.note)
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageUnavailable(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ModerationError::DuplicateWord(word.word));
        }
        Ok(())
    }

    async fn remove_word(&self, word: &str) -> Result<bool, ModerationError> {
        let result = sqlx::query("DELETE FROM banned_words WHERE normalized = ?")
            .bind(word.to_lowercase())
            .execute(&self.pool)
            .await
            .map_err(|e| ModerationError::StorageUnavailable(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
