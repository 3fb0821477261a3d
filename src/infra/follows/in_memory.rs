// In-memory implementation of FollowStore.
#![allow(dead_code)]

use crate::core::follows::{Follow, FollowError, FollowStore};
use async_trait::async_trait;
use dashmap::DashSet;

pub struct InMemoryFollowStore {
    relations: DashSet<Follow>,
}

impl InMemoryFollowStore {
    pub fn new() -> Self {
        Self {
            relations: DashSet::new(),
        }
    }
}

impl Default for InMemoryFollowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FollowStore for InMemoryFollowStore {
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
        let mut authors: Vec<u64> = self
            .relations
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.author_id)
            .collect();
        authors.sort_unstable();
        Ok(authors)
    }

    async fn followers(&self, author_id: u64) -> Result<Vec<u64>, FollowError> {
        let mut users: Vec<u64> = self
            .relations
            .iter()
            .filter(|f| f.author_id == author_id)
            .map(|f| f.user_id)
            .collect();
        users.sort_unstable();
        Ok(users)
    }
}
