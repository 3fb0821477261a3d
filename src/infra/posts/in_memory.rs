// In-memory implementation of PostStore.
//
// DashMap tables plus atomic id counters, mirroring what the SQLite store
// does with autoincrement rowids. Ids start at 1 per table.

#![allow(dead_code)]

use crate::core::posts::{Comment, Group, Post, PostDraft, PostError, PostStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct InMemoryPostStore {
    posts: DashMap<u64, Post>,
    groups: DashMap<u64, Group>,
    comments: DashMap<u64, Comment>,
    post_seq: AtomicU64,
    group_seq: AtomicU64,
    comment_seq: AtomicU64,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut posts: Vec<Post>, limit: usize) -> Vec<Post> {
        posts.sort_by(|a, b| (b.published_at, b.id).cmp(&(a.published_at, a.id)));
        posts.truncate(limit);
        posts
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert_post(
        &self,
        author_id: u64,
        draft: &PostDraft,
        published_at: DateTime<Utc>,
    ) -> Result<Post, PostError> {
        let id = self.post_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let post = Post {
            id,
            author_id,
            text: draft.text.clone(),
            group_id: draft.group_id,
            image: draft.image.clone(),
            published_at,
        };
        self.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, post: &Post) -> Result<(), PostError> {
        if !self.posts.contains_key(&post.id) {
            return Err(PostError::PostNotFound(post.id));
        }
        self.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn get_post(&self, post_id: u64) -> Result<Option<Post>, PostError> {
        Ok(self.posts.get(&post_id).map(|p| p.clone()))
    }

    async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>, PostError> {
        let all = self.posts.iter().map(|p| p.clone()).collect();
        Ok(Self::newest_first(all, limit))
    }

    async fn posts_by_group(&self, group_id: u64, limit: usize) -> Result<Vec<Post>, PostError> {
        let matching = self
            .posts
            .iter()
            .filter(|p| p.group_id == Some(group_id))
            .map(|p| p.clone())
            .collect();
        Ok(Self::newest_first(matching, limit))
    }

    async fn posts_by_author(&self, author_id: u64, limit: usize) -> Result<Vec<Post>, PostError> {
        let matching = self
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .map(|p| p.clone())
            .collect();
        Ok(Self::newest_first(matching, limit))
    }

    async fn posts_by_authors(
        &self,
        author_ids: &[u64],
        limit: usize,
    ) -> Result<Vec<Post>, PostError> {
        let matching = self
            .posts
            .iter()
            .filter(|p| author_ids.contains(&p.author_id))
            .map(|p| p.clone())
            .collect();
        Ok(Self::newest_first(matching, limit))
    }

    async fn insert_group(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<Group, PostError> {
        if self.groups.iter().any(|g| g.slug == slug) {
            return Err(PostError::DuplicateSlug(slug.to_string()));
        }
        let id = self.group_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let group = Group {
            id,
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
        };
        self.groups.insert(id, group.clone());
        Ok(group)
    }

    async fn group_by_id(&self, group_id: u64) -> Result<Option<Group>, PostError> {
        Ok(self.groups.get(&group_id).map(|g| g.clone()))
    }

    async fn group_by_slug(&self, slug: &str) -> Result<Option<Group>, PostError> {
        Ok(self
            .groups
            .iter()
            .find(|g| g.slug == slug)
            .map(|g| g.clone()))
    }

    async fn insert_comment(
        &self,
        post_id: u64,
        author_id: u64,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Comment, PostError> {
        let id = self.comment_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let comment = Comment {
            id,
            post_id,
            author_id,
            text: text.to_string(),
            created_at,
        };
        self.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn comments_for_post(&self, post_id: u64) -> Result<Vec<Comment>, PostError> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.clone())
            .collect();
        comments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(comments)
    }
}
