//! Collaborator interfaces consumed by the reconciler and review service
//!
//! The catalog and the progress store are separate traits so a deployment can
//! combine, say, a static catalog with a SQLite progress store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{ProgressRecord, ReviewCard, Word, WordId};
use crate::Result;

pub mod memory;

pub use memory::MemoryStore;

/// Source of the full word catalog
#[async_trait]
pub trait WordCatalog: Send + Sync {
    /// Every learnable word, ordered by identifier
    async fn all_words(&self) -> Result<Vec<Word>>;
}

/// Persistent review progress
///
/// Implementations must enforce one record per word id and compare-and-swap
/// semantics on `update`.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Every progress record with its word, ordered by record id
    async fn get_all(&self) -> Result<Vec<ReviewCard>>;

    /// Progress record for one word, if any
    async fn get_by_word_id(&self, word_id: WordId) -> Result<Option<ProgressRecord>>;

    /// Records whose next review lies in `[start, end)`
    async fn get_due_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ReviewCard>>;

    /// Records whose word category equals `category` exactly
    async fn get_by_category(&self, category: &str) -> Result<Vec<ReviewCard>>;

    /// Insert a new record and return it with its assigned id
    ///
    /// Fails with [`crate::Error::Conflict`] if the word already has a record
    /// and with [`crate::Error::NotFound`] if the word is not in the catalog.
    async fn insert(&self, record: &ProgressRecord) -> Result<ProgressRecord>;

    /// Write all mutable fields of an existing record
    ///
    /// The write only happens if the stored revision equals
    /// `record.revision`; the returned record carries the bumped revision.
    /// A stale revision fails with [`crate::Error::Conflict`], a missing
    /// record with [`crate::Error::NotFound`].
    async fn update(&self, record: &ProgressRecord) -> Result<ProgressRecord>;
}
