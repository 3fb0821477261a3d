// Publishing service - core business logic for posts, groups and comments.
//
// Every post submission (create and edit) runs through the banned-word
// screening before anything is persisted; a rejected draft leaves no trace.
// Comments go in unscreened - only the post path ever ran the filter, and
// keeping it that way is part of the observable behavior.

use super::post_models::{Comment, Group, Post, PostDraft, Submission};
use crate::core::moderation::{BannedWordStore, ModerationError, ModerationService, Screening};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post {0} not found")]
    PostNotFound(u64),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Group slug is already taken: {0}")]
    DuplicateSlug(String),

    #[error("Only the author can edit a post")]
    NotAuthor,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error(transparent)]
    Moderation(#[from] ModerationError),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting posts, groups and comments.
///
/// Listing queries return newest-first and honor `limit`.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(
        &self,
        author_id: u64,
        draft: &PostDraft,
        published_at: DateTime<Utc>,
    ) -> Result<Post, PostError>;

    /// Overwrite the stored post with the given one (matched by id).
    async fn update_post(&self, post: &Post) -> Result<(), PostError>;

    async fn get_post(&self, post_id: u64) -> Result<Option<Post>, PostError>;

    async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>, PostError>;

    async fn posts_by_group(&self, group_id: u64, limit: usize) -> Result<Vec<Post>, PostError>;

    async fn posts_by_author(&self, author_id: u64, limit: usize) -> Result<Vec<Post>, PostError>;

    /// Posts by any of the given authors, newest first. An empty author list
    /// yields an empty result.
    async fn posts_by_authors(
        &self,
        author_ids: &[u64],
        limit: usize,
    ) -> Result<Vec<Post>, PostError>;

    /// Fails with `DuplicateSlug` when the slug is already taken.
    async fn insert_group(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<Group, PostError>;

    async fn group_by_id(&self, group_id: u64) -> Result<Option<Group>, PostError>;

    async fn group_by_slug(&self, slug: &str) -> Result<Option<Group>, PostError>;

    async fn insert_comment(
        &self,
        post_id: u64,
        author_id: u64,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Comment, PostError>;

    /// Comments in chronological order.
    async fn comments_for_post(&self, post_id: u64) -> Result<Vec<Comment>, PostError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// The main service for publishing operations.
///
/// Generic over the post store and the banned-word store behind the injected
/// moderation service, so tests can swap in in-memory fakes for both.
pub struct PostService<P: PostStore, B: BannedWordStore> {
    store: P,
    moderation: ModerationService<B>,
}

impl<P: PostStore, B: BannedWordStore> PostService<P, B> {
    pub fn new(store: P, moderation: ModerationService<B>) -> Self {
        Self { store, moderation }
    }

    /// The screening service, for moderator tooling that manages the
    /// vocabulary alongside publishing.
    pub fn moderation(&self) -> &ModerationService<B> {
        &self.moderation
    }

    async fn ensure_group_exists(&self, group_id: Option<u64>) -> Result<(), PostError> {
        if let Some(id) = group_id {
            if self.store.group_by_id(id).await?.is_none() {
                return Err(PostError::GroupNotFound(id.to_string()));
            }
        }
        Ok(())
    }

    /// Submit a new post.
    ///
    /// The draft text is screened first; a hit returns
    /// `Submission::Rejected` and persists nothing. A screening failure
    /// (store unreachable) fails the whole submission - text is never
    /// accepted on a guess.
    pub async fn submit_post(
        &self,
        author_id: u64,
        draft: PostDraft,
    ) -> Result<Submission, PostError> {
        match self.moderation.screen(&draft.text).await? {
            Screening::Rejected { message } => Ok(Submission::Rejected { message }),
            Screening::Accepted(_) => {
                self.ensure_group_exists(draft.group_id).await?;
                let post = self.store.insert_post(author_id, &draft, Utc::now()).await?;
                tracing::info!(post_id = post.id, author_id, "post published");
                Ok(Submission::Published(post))
            }
        }
    }

    /// Edit an existing post. Only the author may edit; the new text is
    /// screened exactly like a fresh submission.
    pub async fn edit_post(
        &self,
        editor_id: u64,
        post_id: u64,
        draft: PostDraft,
    ) -> Result<Submission, PostError> {
        let mut post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or(PostError::PostNotFound(post_id))?;
        if post.author_id != editor_id {
            return Err(PostError::NotAuthor);
        }
        match self.moderation.screen(&draft.text).await? {
            Screening::Rejected { message } => Ok(Submission::Rejected { message }),
            Screening::Accepted(text) => {
                self.ensure_group_exists(draft.group_id).await?;
                post.text = text;
                post.group_id = draft.group_id;
                post.image = draft.image;
                self.store.update_post(&post).await?;
                Ok(Submission::Published(post))
            }
        }
    }

    pub async fn get_post(&self, post_id: u64) -> Result<Post, PostError> {
        self.store
            .get_post(post_id)
            .await?
            .ok_or(PostError::PostNotFound(post_id))
    }

    /// A post together with its comments, oldest comment first.
    pub async fn post_detail(&self, post_id: u64) -> Result<(Post, Vec<Comment>), PostError> {
        let post = self.get_post(post_id).await?;
        let comments = self.store.comments_for_post(post_id).await?;
        Ok((post, comments))
    }

    /// The latest posts across all authors, newest first.
    pub async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>, PostError> {
        self.store.recent_posts(limit).await
    }

    /// The latest posts in the group with the given slug.
    pub async fn group_posts(&self, slug: &str, limit: usize) -> Result<Vec<Post>, PostError> {
        let group = self
            .store
            .group_by_slug(slug)
            .await?
            .ok_or_else(|| PostError::GroupNotFound(slug.to_string()))?;
        self.store.posts_by_group(group.id, limit).await
    }

    /// The latest posts by one author.
    pub async fn author_posts(&self, author_id: u64, limit: usize) -> Result<Vec<Post>, PostError> {
        self.store.posts_by_author(author_id, limit).await
    }

    /// The latest posts by any of the given authors. Callers typically pass
    /// `FollowService::following` output here to build a follow feed.
    pub async fn feed(&self, author_ids: &[u64], limit: usize) -> Result<Vec<Post>, PostError> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.store.posts_by_authors(author_ids, limit).await
    }

    /// Add a comment to an existing post. Comments are not screened.
    pub async fn add_comment(
        &self,
        author_id: u64,
        post_id: u64,
        text: &str,
    ) -> Result<Comment, PostError> {
        if self.store.get_post(post_id).await?.is_none() {
            return Err(PostError::PostNotFound(post_id));
        }
        self.store
            .insert_comment(post_id, author_id, text, Utc::now())
            .await
    }

    pub async fn create_group(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<Group, PostError> {
        self.store.insert_group(title, slug, description).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
