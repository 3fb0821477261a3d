// SQLite-backed post store.
//
// Tables:
// - posts: published posts (optional group and image)
// - groups: thematic groups, unique slug
// - comments: per-post comments
//
// Timestamps are stored as RFC 3339 text.

use crate::core::posts::{Comment, Group, Post, PostDraft, PostError, PostStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

pub struct SqlitePostStore {
    pool: Pool<Sqlite>,
}

impl SqlitePostStore {
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
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER NOT NULL,
                text TEXT NOT NULL,
                group_id INTEGER,
                image TEXT,
                published_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_posts_author
                ON posts(author_id, published_at);
            CREATE INDEX IF NOT EXISTS idx_posts_group
                ON posts(group_id, published_at);
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS groups (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT ''
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                author_id INTEGER NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_comments_post
                ON comments(post_id, created_at);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn post_from_row(row: &SqliteRow) -> Result<Post, PostError> {
        let published_at: String = row.get("published_at");
        let published_at = DateTime::parse_from_rfc3339(&published_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| PostError::StorageError(e.to_string()))?;
        Ok(Post {
            id: row.get::<i64, _>("id") as u64,
            author_id: row.get::<i64, _>("author_id") as u64,
            text: row.get("text"),
            group_id: row.get::<Option<i64>, _>("group_id").map(|id| id as u64),
            image: row.get("image"),
            published_at,
        })
    }

    fn comment_from_row(row: &SqliteRow) -> Result<Comment, PostError> {
        let created_at: String = row.get("created_at");
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| PostError::StorageError(e.to_string()))?;
        Ok(Comment {
            id: row.get::<i64, _>("id") as u64,
            post_id: row.get::<i64, _>("post_id") as u64,
            author_id: row.get::<i64, _>("author_id") as u64,
            text: row.get("text"),
            created_at,
        })
    }

    fn group_from_row(row: &SqliteRow) -> Group {
        Group {
            id: row.get::<i64, _>("id") as u64,
            title: row.get("title"),
            slug: row.get("slug"),
            description: row.get("description"),
        }
    }

    fn collect_posts(rows: Vec<SqliteRow>) -> Result<Vec<Post>, PostError> {
        rows.iter().map(Self::post_from_row).collect()
    }
}

#[async_trait]
impl PostStore for SqlitePostStore {
    async fn insert_post(
        &self,
        author_id: u64,
        draft: &PostDraft,
        published_at: DateTime<Utc>,
    ) -> Result<Post, PostError> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (author_id, text, group_id, image, published_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(author_id as i64)
        .bind(&draft.text)
        .bind(draft.group_id.map(|id| id as i64))
        .bind(&draft.image)
        .bind(published_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        Ok(Post {
            id: result.last_insert_rowid() as u64,
            author_id,
            text: draft.text.clone(),
            group_id: draft.group_id,
            image: draft.image.clone(),
            published_at,
        })
    }

    async fn update_post(&self, post: &Post) -> Result<(), PostError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET text = ?, group_id = ?, image = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.text)
        .bind(post.group_id.map(|id| id as i64))
        .bind(&post.image)
        .bind(post.id as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PostError::PostNotFound(post.id));
        }
        Ok(())
    }

    async fn get_post(&self, post_id: u64) -> Result<Option<Post>, PostError> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(post_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PostError::StorageError(e.to_string()))?;

        row.as_ref().map(Self::post_from_row).transpose()
    }

    async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>, PostError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM posts
            ORDER BY published_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        Self::collect_posts(rows)
    }

    async fn posts_by_group(&self, group_id: u64, limit: usize) -> Result<Vec<Post>, PostError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM posts
            WHERE group_id = ?
            ORDER BY published_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(group_id as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        Self::collect_posts(rows)
    }

    async fn posts_by_author(&self, author_id: u64, limit: usize) -> Result<Vec<Post>, PostError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM posts
            WHERE author_id = ?
            ORDER BY published_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(author_id as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        Self::collect_posts(rows)
    }

    async fn posts_by_authors(
        &self,
        author_ids: &[u64],
        limit: usize,
    ) -> Result<Vec<Post>, PostError> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        // sqlx has no array binding for SQLite, so build the placeholder
        // list by hand and bind each id.
        let placeholders = vec!["?"; author_ids.len()].join(", ");
        let sql = format!(
            "SELECT * FROM posts WHERE author_id IN ({}) \
             ORDER BY published_at DESC, id DESC LIMIT ?",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for id in author_ids {
            query = query.bind(*id as i64);
        }
        let rows = query
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PostError::StorageError(e.to_string()))?;

        Self::collect_posts(rows)
    }

    async fn insert_group(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<Group, PostError> {
        let result = sqlx::query(
            r#"
            INSERT INTO groups (title, slug, description)
            VALUES (?, ?, ?)
            ON CONFLICT(slug) DO NOTHING
            "#,
        )
        .bind(title)
        .bind(slug)
        .bind(description)
        .execute(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PostError::DuplicateSlug(slug.to_string()));
        }

        Ok(Group {
            id: result.last_insert_rowid() as u64,
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
        })
    }

    async fn group_by_id(&self, group_id: u64) -> Result<Option<Group>, PostError> {
        let row = sqlx::query("SELECT * FROM groups WHERE id = ?")
            .bind(group_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PostError::StorageError(e.to_string()))?;

        Ok(row.as_ref().map(Self::group_from_row))
    }

    async fn group_by_slug(&self, slug: &str) -> Result<Option<Group>, PostError> {
        let row = sqlx::query("SELECT * FROM groups WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PostError::StorageError(e.to_string()))?;

        Ok(row.as_ref().map(Self::group_from_row))
    }

    async fn insert_comment(
        &self,
        post_id: u64,
        author_id: u64,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Comment, PostError> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, author_id, text, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(post_id as i64)
        .bind(author_id as i64)
        .bind(text)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        Ok(Comment {
            id: result.last_insert_rowid() as u64,
            post_id,
            author_id,
            text: text.to_string(),
            created_at,
        })
    }

    async fn comments_for_post(&self, post_id: u64) -> Result<Vec<Comment>, PostError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM comments
            WHERE post_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        rows.iter().map(Self::comment_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    async fn temp_store() -> (SqlitePostStore, NamedTempFile) {
        let tmp = NamedTempFile::new().unwrap();
        let store = SqlitePostStore::new(tmp.path().to_str().unwrap())
            .await
            .unwrap();
        (store, tmp)
    }

    #[tokio::test]
    async fn test_post_roundtrip_with_group_and_image() {
        let (store, _tmp) = temp_store().await;
        let group = store.insert_group("Cats", "cats", "cat content").await.unwrap();

        let mut draft = PostDraft::text("Это текст поста");
        draft.group_id = Some(group.id);
        draft.image = Some("posts/cat.png".to_string());
        let published_at = Utc::now();
        let post = store.insert_post(7, &draft, published_at).await.unwrap();

        let loaded = store.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(loaded.text, "Это текст поста");
        assert_eq!(loaded.author_id, 7);
        assert_eq!(loaded.group_id, Some(group.id));
        assert_eq!(loaded.image.as_deref(), Some("posts/cat.png"));
        assert_eq!(loaded.published_at, post.published_at);
    }

    #[tokio::test]
    async fn test_listing_queries_filter_and_order() {
        let (store, _tmp) = temp_store().await;
        let group = store.insert_group("Cats", "cats", "").await.unwrap();

        let base = Utc::now();
        for i in 0..4u64 {
            let mut draft = PostDraft::text(format!("post {}", i));
            if i % 2 == 0 {
                draft.group_id = Some(group.id);
            }
            let author = if i < 2 { 1 } else { 2 };
            store
                .insert_post(author, &draft, base + chrono::Duration::seconds(i as i64))
                .await
                .unwrap();
        }

        let recent = store.recent_posts(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].text, "post 3");

        let grouped = store.posts_by_group(group.id, 10).await.unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].text, "post 2");

        let by_author = store.posts_by_author(1, 10).await.unwrap();
        assert_eq!(by_author.len(), 2);

        let by_authors = store.posts_by_authors(&[1, 2], 10).await.unwrap();
        assert_eq!(by_authors.len(), 4);
        let none = store.posts_by_authors(&[], 10).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_post() {
        let (store, _tmp) = temp_store().await;
        let mut post = store
            .insert_post(1, &PostDraft::text("before"), Utc::now())
            .await
            .unwrap();

        post.text = "after".to_string();
        store.update_post(&post).await.unwrap();

        assert_eq!(store.get_post(post.id).await.unwrap().unwrap().text, "after");

        post.id = 999;
        assert!(matches!(
            store.update_post(&post).await,
            Err(PostError::PostNotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let (store, _tmp) = temp_store().await;
        store.insert_group("Cats", "cats", "").await.unwrap();

        let result = store.insert_group("More cats", "cats", "").await;

        assert!(matches!(result, Err(PostError::DuplicateSlug(_))));
        assert!(store.group_by_slug("cats").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_comments_come_back_in_order() {
        let (store, _tmp) = temp_store().await;
        let post = store
            .insert_post(1, &PostDraft::text("post"), Utc::now())
            .await
            .unwrap();

        let base = Utc::now();
        for i in 0..3u64 {
            store
                .insert_comment(
                    post.id,
                    2,
                    &format!("comment {}", i),
                    base + chrono::Duration::seconds(i as i64),
                )
                .await
                .unwrap();
        }

        let comments = store.comments_for_post(post.id).await.unwrap();
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].text, "comment 0");
        assert_eq!(comments[2].text, "comment 2");
    }
}
