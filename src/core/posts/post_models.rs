// Posts domain models - data structures for publishing.
//
// These are pure domain types with no storage or transport dependencies.
// Authors are referenced by plain user id; accounts live outside this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A thematic group posts can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub title: String,
    /// URL-friendly identifier, unique across groups.
    pub slug: String,
    pub description: String,
}

/// A published post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub author_id: u64,
    pub text: String,
    /// Group the post is filed under, if any.
    pub group_id: Option<u64>,
    /// Stored image file name. Upload handling lives outside this crate.
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// What a submitter provides when creating or editing a post.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<u64>,
    pub image: Option<String>,
}

impl PostDraft {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A comment on a post. Comments are not screened by moderation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub author_id: u64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a post submission attempt.
///
/// Rejection by moderation is an expected, user-correctable outcome, so it
/// is a variant here rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Published(Post),
    Rejected { message: String },
}

impl Submission {
    #[allow(dead_code)]
    pub fn is_published(&self) -> bool {
        matches!(self, Submission::Published(_))
    }
}
