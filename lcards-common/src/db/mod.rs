//! SQLite-backed catalog and progress store

pub mod init;
pub mod progress;
pub mod words;

pub use init::init_database;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{ProgressRecord, ReviewCard, Word, WordId};
use crate::store::{ProgressStore, WordCatalog};
use crate::Result;

/// Catalog and progress store over one SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WordCatalog for SqliteStore {
    async fn all_words(&self) -> Result<Vec<Word>> {
        words::list_words(&self.pool).await
    }
}

#[async_trait]
impl ProgressStore for SqliteStore {
    async fn get_all(&self) -> Result<Vec<ReviewCard>> {
        progress::load_all_cards(&self.pool).await
    }

    async fn get_by_word_id(&self, word_id: WordId) -> Result<Option<ProgressRecord>> {
        progress::load_progress_by_word(&self.pool, word_id).await
    }

    async fn get_due_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ReviewCard>> {
        progress::load_cards_due_between(&self.pool, start, end).await
    }

    async fn get_by_category(&self, category: &str) -> Result<Vec<ReviewCard>> {
        progress::load_cards_by_category(&self.pool, category).await
    }

    async fn insert(&self, record: &ProgressRecord) -> Result<ProgressRecord> {
        progress::insert_progress(&self.pool, record).await
    }

    async fn update(&self, record: &ProgressRecord) -> Result<ProgressRecord> {
        progress::update_progress(&self.pool, record).await
    }
}
