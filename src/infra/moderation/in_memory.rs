// In-memory implementation of BannedWordStore.
//
// Entries are keyed on the lower-cased form, which is what enforces the
// vocabulary's case-insensitive uniqueness. Useful for tests and for
// running the pipeline without any files on disk.

#![allow(dead_code)]

use crate::core::moderation::{BannedWord, BannedWordStore, ModerationError};
use async_trait::async_trait;
use dashmap::DashMap;

pub struct InMemoryBannedWordStore {
    words: DashMap<String, BannedWord>,
}

impl InMemoryBannedWordStore {
    pub fn new() -> Self {
        Self {
            words: DashMap::new(),
        }
    }
}

impl Default for InMemoryBannedWordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BannedWordStore for InMemoryBannedWordStore {
    async fn list_words(&self) -> Result<Vec<BannedWord>, ModerationError> {
        let mut words: Vec<BannedWord> = self.words.iter().map(|e| e.value().clone()).collect();
        words.sort_by(|a, b| a.word.cmp(&b.word));
        Ok(words)
    }

    async fn insert_word(&self, word: BannedWord) -> Result<(), ModerationError> {
        let key = word.normalized();
        if self.words.contains_key(&key) {
            return Err(ModerationError::DuplicateWord(word.word));
        }
        self.words.insert(key, word);
        Ok(())
    }

    async fn remove_word(&self, word: &str) -> Result<bool, ModerationError> {
        Ok(self.words.remove(&word.to_lowercase()).is_some())
    }
}
