// SQLite-backed follow store.
//
// One table with a composite primary key; INSERT OR IGNORE gives the
// insert-if-absent semantics the port asks for.

use crate::core::follows::{FollowError, FollowStore};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

pub struct SqliteFollowStore {
    pool: Pool<Sqlite>,
}

impl SqliteFollowStore {
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
            CREATE TABLE IF NOT EXISTS follows (
                user_id INTEGER NOT NULL,
                author_id INTEGER NOT NULL,
                PRIMARY KEY (user_id, author_id)
            );
            CREATE INDEX IF NOT EXISTS idx_follows_author
                ON follows(author_id);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl FollowStore for SqliteFollowStore {
    async fn add(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO follows (user_id, author_id)
            VALUES (?, ?)
            "#,
        )
        .bind(user_id as i64)
        .bind(author_id as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| FollowError::StorageError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(user_id as i64)
            .bind(author_id as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| FollowError::StorageError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError> {
        let row = sqlx::query("SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(user_id as i64)
            .bind(author_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| FollowError::StorageError(e.to_string()))?;

        Ok(row.is_some())
    }

    async fn following(&self, user_id: u64) -> Result<Vec<u64>, FollowError> {
        let rows = sqlx::query("SELECT author_id FROM follows WHERE user_id = ? ORDER BY author_id")
            .bind(user_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FollowError::StorageError(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| row.get::<i64, _>("author_id") as u64)
            .collect())
    }

    async fn followers(&self, author_id: u64) -> Result<Vec<u64>, FollowError> {
        let rows = sqlx::query("SELECT user_id FROM follows WHERE author_id = ? ORDER BY user_id")
            .bind(author_id as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FollowError::StorageError(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| row.get::<i64, _>("user_id") as u64)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_follow_roundtrip() {
        let tmp = NamedTempFile::new().unwrap();
        let store = SqliteFollowStore::new(tmp.path().to_str().unwrap())
            .await
            .unwrap();

        assert!(store.add(1, 2).await.unwrap());
        assert!(!store.add(1, 2).await.unwrap());
        assert!(store.add(1, 3).await.unwrap());
        assert!(store.add(4, 2).await.unwrap());

        assert!(store.exists(1, 2).await.unwrap());
        assert_eq!(store.following(1).await.unwrap(), vec![2, 3]);
        assert_eq!(store.followers(2).await.unwrap(), vec![1, 4]);

        assert!(store.remove(1, 2).await.unwrap());
        assert!(!store.remove(1, 2).await.unwrap());
        assert!(!store.exists(1, 2).await.unwrap());
    }
}
