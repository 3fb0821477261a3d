// Banned-word screening - core business logic for submission moderation.
//
// Matching granularity is deliberately coarse: text is split on whitespace,
// both sides are lower-cased, and a submission is rejected iff a whole token
// equals a vocabulary entry. Substrings ("bad" inside "badly") and tokens
// with punctuation attached ("плохоеслово,") do NOT match. Changing this
// would change which posts get through, so the tests pin the misses as well
// as the hits.
//
// NO storage or transport dependencies here - just pure domain logic plus a
// storage trait for the vocabulary.

use super::moderation_models::{BannedWord, Screening, MAX_NOTE_LEN, MAX_WORD_LEN};
use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    /// The vocabulary could not be read. A screening must fail with this
    /// rather than fall back to an empty vocabulary - an unreachable store
    /// never means "allow".
    #[error("Banned word store unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid banned word: {0}")]
    InvalidWord(String),

    #[error("Word is already in the vocabulary: {0}")]
    DuplicateWord(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting the banned vocabulary.
///
/// The screening path only ever calls `list_words`; the mutating operations
/// exist for moderator tooling. Uniqueness is keyed on the lower-cased form
/// of the word, so "ФУ" and "фу" are the same entry.
#[async_trait]
pub trait BannedWordStore: Send + Sync {
    /// Every entry in the vocabulary. No ordering guarantee is required by
    /// the screening path; implementations list by display word for the
    /// benefit of moderator tooling.
    async fn list_words(&self) -> Result<Vec<BannedWord>, ModerationError>;

    /// Insert an entry. Fails with `DuplicateWord` when an entry with the
    /// same normalized form already exists.
    async fn insert_word(&self, word: BannedWord) -> Result<(), ModerationError>;

    /// Remove the entry matching `word` case-insensitively. Returns whether
    /// anything was removed.
    async fn remove_word(&self, word: &str) -> Result<bool, ModerationError>;
}

// ============================================================================
// PURE OPERATIONS
// ============================================================================

/// Split `text` on whitespace runs and collect the distinct lower-cased
/// tokens. Empty or whitespace-only input yields the empty set. Never fails.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// True iff the two sets intersect. Pure and symmetric.
pub fn has_banned_word(tokens: &HashSet<String>, banned: &HashSet<String>) -> bool {
    !tokens.is_disjoint(banned)
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Screens submitted text against the banned vocabulary and carries the
/// moderator operations for maintaining that vocabulary.
pub struct ModerationService<S: BannedWordStore> {
    store: S,
}

impl<S: BannedWordStore> ModerationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// A fresh lower-cased snapshot of the vocabulary. Re-derived on every
    /// call - there is no caching, so each screening sees the store as it is
    /// at call time.
    pub async fn banned_set(&self) -> Result<HashSet<String>, ModerationError> {
        let words = self.store.list_words().await?;
        Ok(words.into_iter().map(|w| w.normalized()).collect())
    }

    /// Screen one submission.
    ///
    /// Returns `Screening::Rejected` when any whole token matches the
    /// vocabulary, otherwise `Screening::Accepted` with the original text.
    /// The only error is the store being unreachable, which is propagated -
    /// the caller decides what a failed screening means for the submission.
    pub async fn screen(&self, text: &str) -> Result<Screening, ModerationError> {
        let banned = self.banned_set().await?;
        let tokens = tokenize(text);
        if has_banned_word(&tokens, &banned) {
            tracing::info!("submission rejected by banned-word screening");
            Ok(Screening::rejected())
        } else {
            Ok(Screening::accepted(text))
        }
    }

    /// Add a word to the vocabulary (moderator operation).
    pub async fn add_word(
        &self,
        word: &str,
        word_type: &str,
        note: &str,
    ) -> Result<(), ModerationError> {
        let word = word.trim();
        if word.is_empty() || word.split_whitespace().count() != 1 {
            return Err(ModerationError::InvalidWord(
                "expected a single non-empty word".to_string(),
            ));
        }
        if word.chars().count() > MAX_WORD_LEN {
            return Err(ModerationError::InvalidWord(format!(
                "word exceeds {} characters",
                MAX_WORD_LEN
            )));
        }
        if note.chars().count() > MAX_NOTE_LEN {
            return Err(ModerationError::InvalidWord(format!(
                "note exceeds {} characters",
                MAX_NOTE_LEN
            )));
        }
        self.store
            .insert_word(BannedWord::new(word, word_type, note))
            .await
    }

    /// Remove a word, matched case-insensitively. Returns whether an entry
    /// was removed.
    pub async fn remove_word(&self, word: &str) -> Result<bool, ModerationError> {
        self.store.remove_word(word).await
    }

    /// The whole vocabulary, for moderator tooling.
    pub async fn list_words(&self) -> Result<Vec<BannedWord>, ModerationError> {
        self.store.list_words().await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::REJECTION_MESSAGE;
    use dashmap::DashMap;

    /// In-memory store for testing, keyed on the normalized form.
    struct MockWordStore {
        words: DashMap<String, BannedWord>,
    }

    impl MockWordStore {
        fn new() -> Self {
            Self {
                words: DashMap::new(),
            }
        }

        fn with_words(words: &[&str]) -> Self {
            let store = Self::new();
            for w in words {
                store
                    .words
                    .insert(w.to_lowercase(), BannedWord::new(*w, "test", ""));
            }
            store
        }
    }

    #[async_trait]
    impl BannedWordStore for MockWordStore {
        async fn list_words(&self) -> Result<Vec<BannedWord>, ModerationError> {
            Ok(self.words.iter().map(|e| e.value().clone()).collect())
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

    /// A store whose reads always fail, standing in for a database outage.
    struct UnavailableWordStore;

    #[async_trait]
    impl BannedWordStore for UnavailableWordStore {
        async fn list_words(&self) -> Result<Vec<BannedWord>, ModerationError> {
            Err(ModerationError::StorageUnavailable(
                "connection refused".to_string(),
            ))
        }

        async fn insert_word(&self, _word: BannedWord) -> Result<(), ModerationError> {
            Err(ModerationError::StorageUnavailable(
                "connection refused".to_string(),
            ))
        }

        async fn remove_word(&self, _word: &str) -> Result<bool, ModerationError> {
            Err(ModerationError::StorageUnavailable(
                "connection refused".to_string(),
            ))
        }
    }

    #[test]
    fn test_tokenize_lowercases_and_dedupes() {
        let tokens = tokenize("Word word WORD other");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("word"));
        assert!(tokens.contains("other"));
        for t in &tokens {
            assert_eq!(*t, t.to_lowercase());
        }
    }

    #[test]
    fn test_tokenize_empty_and_whitespace_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t \n ").is_empty());
    }

    #[test]
    fn test_intersection_check_is_symmetric() {
        let a = tokenize("это плохоеслово в тексте");
        let b = tokenize("плохоеслово другое");
        assert_eq!(has_banned_word(&a, &b), has_banned_word(&b, &a));

        let c = tokenize("ничего общего");
        assert_eq!(has_banned_word(&a, &c), has_banned_word(&c, &a));
    }

    #[tokio::test]
    async fn test_banned_token_rejects_submission() {
        let service = ModerationService::new(MockWordStore::with_words(&["плохоеслово"]));

        let result = service.screen("Это плохоеслово в тексте").await.unwrap();

        assert_eq!(
            result,
            Screening::Rejected {
                message: REJECTION_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_punctuation_breaks_whole_token_match() {
        let service = ModerationService::new(MockWordStore::with_words(&["плохоеслово"]));

        // A trailing comma makes the token "плохоеслово," which is not an
        // exact match. This documents the matching limitation.
        let result = service.screen("Это плохоеслово, в тексте").await.unwrap();

        assert!(result.is_accepted());
    }

    #[tokio::test]
    async fn test_substring_is_not_matched() {
        let service = ModerationService::new(MockWordStore::with_words(&["bad"]));

        let result = service.screen("badly written post").await.unwrap();

        assert!(result.is_accepted());
    }

    #[tokio::test]
    async fn test_empty_vocabulary_accepts_anything() {
        let service = ModerationService::new(MockWordStore::new());

        let result = service.screen("anything at all").await.unwrap();

        assert_eq!(result, Screening::accepted("anything at all"));
    }

    #[tokio::test]
    async fn test_empty_text_is_accepted() {
        let service = ModerationService::new(MockWordStore::with_words(&["плохоеслово"]));

        let result = service.screen("").await.unwrap();

        assert_eq!(result, Screening::accepted(""));
    }

    #[tokio::test]
    async fn test_mixed_case_vocabulary_still_matches() {
        // "ФУ" stored upper-case, submitted lower-case - both sides are
        // normalized, so it still hits.
        let service = ModerationService::new(MockWordStore::with_words(&["ФУ"]));

        let result = service.screen("фу").await.unwrap();

        assert!(!result.is_accepted());
    }

    #[tokio::test]
    async fn test_accepted_text_is_returned_unnormalized() {
        let service = ModerationService::new(MockWordStore::with_words(&["bad"]));

        let result = service.screen("A Perfectly FINE Post").await.unwrap();

        assert_eq!(result, Screening::accepted("A Perfectly FINE Post"));
    }

    #[tokio::test]
    async fn test_screening_is_idempotent() {
        let service = ModerationService::new(MockWordStore::with_words(&["bad"]));

        let first = service.screen("this is bad").await.unwrap();
        let second = service.screen("this is bad").await.unwrap();
        assert_eq!(first, second);

        let first = service.screen("this is fine").await.unwrap();
        let second = service.screen("this is fine").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_the_screening() {
        let service = ModerationService::new(UnavailableWordStore);

        let result = service.screen("any text").await;

        // Never silently treated as an empty vocabulary.
        assert!(matches!(
            result,
            Err(ModerationError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_add_word_rejects_blank_and_multiword_input() {
        let service = ModerationService::new(MockWordStore::new());

        assert!(matches!(
            service.add_word("  ", "profanity", "").await,
            Err(ModerationError::InvalidWord(_))
        ));
        assert!(matches!(
            service.add_word("two words", "profanity", "").await,
            Err(ModerationError::InvalidWord(_))
        ));
    }

    #[tokio::test]
    async fn test_add_word_enforces_length_caps() {
        let service = ModerationService::new(MockWordStore::new());

        let long_word = "x".repeat(MAX_WORD_LEN + 1);
        assert!(matches!(
            service.add_word(&long_word, "profanity", "").await,
            Err(ModerationError::InvalidWord(_))
        ));

        let long_note = "y".repeat(MAX_NOTE_LEN + 1);
        assert!(matches!(
            service.add_word("word", "profanity", &long_note).await,
            Err(ModerationError::InvalidWord(_))
        ));
    }

    #[tokio::test]
    async fn test_add_word_rejects_case_insensitive_duplicates() {
        let service = ModerationService::new(MockWordStore::new());

        service.add_word("ФУ", "profanity", "").await.unwrap();
        let result = service.add_word("фу", "profanity", "").await;

        assert!(matches!(result, Err(ModerationError::DuplicateWord(_))));
    }

    #[tokio::test]
    async fn test_remove_word_is_case_insensitive() {
        let service = ModerationService::new(MockWordStore::with_words(&["ФУ"]));

        assert!(service.remove_word("фу").await.unwrap());
        assert!(!service.remove_word("фу").await.unwrap());
        assert!(service.screen("фу").await.unwrap().is_accepted());
    }
}
