// Moderation domain models - data structures for the banned-word system.
//
// These are pure domain types with no storage or transport dependencies.

use serde::{Deserialize, Serialize};

/// Longest word a moderator may add to the vocabulary.
pub const MAX_WORD_LEN: usize = 50;
/// Longest free-text note attached to a vocabulary entry.
pub const MAX_NOTE_LEN: usize = 75;

/// Shown to the submitter when their text hits the banned vocabulary.
pub const REJECTION_MESSAGE: &str = "Использование запрещенных слов не допустимо. \
     Ну и ну вы разочаровали партию. \
     -10000 социального рейтинга.";

/// One entry in the banned vocabulary, as curated by a moderator.
///
/// `word` keeps the display form exactly as entered; comparison always goes
/// through the lower-cased form, so uniqueness is enforced on that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannedWord {
    pub word: String,
    /// Classification label, e.g. "profanity" or "slur".
    pub word_type: String,
    /// Optional moderator note. Empty string when absent.
    pub note: String,
}

impl BannedWord {
    pub fn new(
        word: impl Into<String>,
        word_type: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            word_type: word_type.into(),
            note: note.into(),
        }
    }

    /// The form used for matching and uniqueness.
    pub fn normalized(&self) -> String {
        self.word.to_lowercase()
    }
}

/// Result of screening one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screening {
    /// Text passed. Carries the original text untouched - lower-casing is
    /// only ever applied for the comparison, never to the stored value.
    Accepted(String),
    /// Text hit the vocabulary. Carries the user-facing message.
    Rejected { message: String },
}

impl Screening {
    /// Create an "accepted" result carrying the original text.
    pub fn accepted(text: impl Into<String>) -> Self {
        Screening::Accepted(text.into())
    }

    /// Create a "rejected" result with the fixed user-facing message.
    pub fn rejected() -> Self {
        Screening::Rejected {
            message: REJECTION_MESSAGE.to_string(),
        }
    }

    #[allow(dead_code)]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Screening::Accepted(_))
    }
}
