// Follow service - core business logic for author subscriptions.
//
// A follow is a plain (user, author) pair. Following is idempotent,
// unfollowing a relation that does not exist is not an error, and users
// cannot follow themselves. The follow feed itself lives in the posts
// module (`PostService::feed`); callers pass `following()` output there.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One subscription: `user_id` reads what `author_id` publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Follow {
    pub user_id: u64,
    pub author_id: u64,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("Users cannot follow themselves")]
    SelfFollow,

    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting follow relations.
#[async_trait]
pub trait FollowStore: Send + Sync {
    /// Insert the relation if absent. Returns whether it was newly created.
    async fn add(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError>;

    /// Remove the relation if present. Returns whether it existed.
    async fn remove(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError>;

    async fn exists(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError>;

    /// Authors the user follows.
    async fn following(&self, user_id: u64) -> Result<Vec<u64>, FollowError>;

    /// Users following the author.
    async fn followers(&self, author_id: u64) -> Result<Vec<u64>, FollowError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct FollowService<S: FollowStore> {
    store: S,
}

impl<S: FollowStore> FollowService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Subscribe `user_id` to `author_id`. Returns whether a new relation
    /// was created; following an already-followed author is a no-op.
    pub async fn follow(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError> {
        if user_id == author_id {
            return Err(FollowError::SelfFollow);
        }
        self.store.add(user_id, author_id).await
    }

    /// Unsubscribe. Returns whether a relation existed.
    pub async fn unfollow(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError> {
        self.store.remove(user_id, author_id).await
    }

    #[allow(dead_code)]
    pub async fn is_following(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError> {
        self.store.exists(user_id, author_id).await
    }

    /// Authors the user follows, for building their feed.
    pub async fn following(&self, user_id: u64) -> Result<Vec<u64>, FollowError> {
        self.store.following(user_id).await
    }

    pub async fn followers(&self, author_id: u64) -> Result<Vec<u64>, FollowError> {
        self.store.followers(author_id).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::DashSet;

    /// In-memory store for testing.
    struct MockFollowStore {
        relations: DashSet<Follow>,
    }

    impl MockFollowStore {
        fn new() -> Self {
            Self {
                relations: DashSet::new(),
            }
        }
    }

    #[async_trait]
    impl FollowStore for MockFollowStore {
        async fn add(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError> {
            Ok(self.relations.insert(Follow { user_id, author_id }))
        }

        async fn remove(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError> {
            Ok(self
                .relations
                .remove(&Follow { user_id, author_id })
                .is_some())
        }

        async fn exists(&self, user_id: u64, author_id: u64) -> Result<bool, FollowError> {
            Ok(self.relations.contains(&Follow { user_id, author_id }))
        }

        async fn following(&self, user_id: u64) -> Result<Vec<u64>, FollowError> {
            Ok(self
                .relations
                .iter()
                .filter(|f| f.user_id == user_id)
                .map(|f| f.author_id)
                .collect())
        }

        async fn followers(&self, author_id: u64) -> Result<Vec<u64>, FollowError> {
            Ok(self
                .relations
                .iter()
                .filter(|f| f.author_id == author_id)
                .map(|f| f.user_id)
                .collect())
        }
    }

    #[tokio::test]
    async fn test_follow_and_check() {
        let service = FollowService::new(MockFollowStore::new());

        assert!(service.follow(1, 2).await.unwrap());
        assert!(service.is_following(1, 2).await.unwrap());
        // Directional: 2 does not follow 1.
        assert!(!service.is_following(2, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_follow_is_idempotent() {
        let service = FollowService::new(MockFollowStore::new());

        assert!(service.follow(1, 2).await.unwrap());
        assert!(!service.follow(1, 2).await.unwrap());
        assert_eq!(service.following(1).await.unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_self_follow_is_rejected() {
        let service = FollowService::new(MockFollowStore::new());

        let result = service.follow(1, 1).await;

        assert!(matches!(result, Err(FollowError::SelfFollow)));
        assert!(!service.is_following(1, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_unfollow_reports_whether_relation_existed() {
        let service = FollowService::new(MockFollowStore::new());
        service.follow(1, 2).await.unwrap();

        assert!(service.unfollow(1, 2).await.unwrap());
        assert!(!service.unfollow(1, 2).await.unwrap());
        assert!(!service.is_following(1, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_following_and_followers_listings() {
        let service = FollowService::new(MockFollowStore::new());
        service.follow(1, 2).await.unwrap();
        service.follow(1, 3).await.unwrap();
        service.follow(4, 2).await.unwrap();

        let mut following = service.following(1).await.unwrap();
        following.sort_unstable();
        assert_eq!(following, vec![2, 3]);

        let mut followers = service.followers(2).await.unwrap();
        followers.sort_unstable();
        assert_eq!(followers, vec![1, 4]);
    }
}
