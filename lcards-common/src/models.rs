//! Catalog and progress models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Word identifier as assigned by the catalog
pub type WordId = i64;

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    /// Display text (the word being learned)
    pub text: String,
    pub translation: String,
    /// Comma-joined category label, e.g. `"basic, shopping"`
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog entry before it has been assigned an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWord {
    pub text: String,
    pub translation: String,
    pub category: String,
}

impl NewWord {
    pub fn new(
        text: impl Into<String>,
        translation: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            translation: translation.into(),
            category: category.into(),
        }
    }
}

/// Review progress for a single word
///
/// There is at most one record per word. `box_number` is the Leitner box
/// (1..=5). `revision` is bumped by the store on every successful update and
/// is used for compare-and-swap writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Store-assigned identifier, `None` until inserted
    pub id: Option<i64>,
    pub word_id: WordId,
    pub box_number: u8,
    pub last_review: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
    pub correct_attempts: u32,
    pub incorrect_attempts: u32,
    pub revision: i64,
}

/// A progress record loaded together with its word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCard {
    #[serde(flatten)]
    pub progress: ProgressRecord,
    pub word: Word,
}

impl ReviewCard {
    pub fn word_id(&self) -> WordId {
        self.progress.word_id
    }
}
