//! In-process catalog and progress store
//!
//! Backs tests and ephemeral deployments. All state sits behind one async
//! mutex, which gives the same per-word uniqueness and compare-and-swap
//! guarantees as the SQLite store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{ProgressStore, WordCatalog};
use crate::models::{NewWord, ProgressRecord, ReviewCard, Word, WordId};
use crate::{time, Error, Result};

#[derive(Debug, Default)]
struct Inner {
    words: BTreeMap<WordId, Word>,
    /// Keyed by word id
    progress: BTreeMap<WordId, ProgressRecord>,
    next_word_id: WordId,
    next_record_id: i64,
}

impl Inner {
    fn card(&self, record: &ProgressRecord) -> Option<ReviewCard> {
        self.words.get(&record.word_id).map(|word| ReviewCard {
            progress: record.clone(),
            word: word.clone(),
        })
    }

    fn cards_where(&self, keep: impl Fn(&ReviewCard) -> bool) -> Vec<ReviewCard> {
        let mut cards: Vec<ReviewCard> = self
            .progress
            .values()
            .filter_map(|record| self.card(record))
            .filter(|card| keep(card))
            .collect();
        cards.sort_by_key(|card| card.progress.id);
        cards
    }
}

/// Catalog and progress store held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word to the catalog
    ///
    /// Words are unique by text; adding an existing text returns the stored word.
    pub async fn add_word(&self, new_word: NewWord) -> Word {
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner.words.values().find(|w| w.text == new_word.text) {
            return existing.clone();
        }

        inner.next_word_id += 1;
        let word = Word {
            id: inner.next_word_id,
            text: new_word.text,
            translation: new_word.translation,
            category: new_word.category,
            created_at: time::now(),
        };
        inner.words.insert(word.id, word.clone());
        word
    }

    /// Add several words, returning them in input order
    pub async fn add_words(&self, new_words: impl IntoIterator<Item = NewWord>) -> Vec<Word> {
        let mut added = Vec::new();
        for new_word in new_words {
            added.push(self.add_word(new_word).await);
        }
        added
    }

    /// Number of progress records currently held
    pub async fn progress_count(&self) -> usize {
        self.inner.lock().await.progress.len()
    }
}

#[async_trait]
impl WordCatalog for MemoryStore {
    async fn all_words(&self) -> Result<Vec<Word>> {
        Ok(self.inner.lock().await.words.values().cloned().collect())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<ReviewCard>> {
        Ok(self.inner.lock().await.cards_where(|_| true))
    }

    async fn get_by_word_id(&self, word_id: WordId) -> Result<Option<ProgressRecord>> {
        Ok(self.inner.lock().await.progress.get(&word_id).cloned())
    }

    async fn get_due_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ReviewCard>> {
        Ok(self.inner.lock().await.cards_where(|card| {
            card.progress.next_review >= start && card.progress.next_review < end
        }))
    }

    async fn get_by_category(&self, category: &str) -> Result<Vec<ReviewCard>> {
        Ok(self
            .inner
            .lock()
            .await
            .cards_where(|card| card.word.category == category))
    }

    async fn insert(&self, record: &ProgressRecord) -> Result<ProgressRecord> {
        let mut inner = self.inner.lock().await;
        if !inner.words.contains_key(&record.word_id) {
            return Err(Error::NotFound(format!("word {}", record.word_id)));
        }
        if inner.progress.contains_key(&record.word_id) {
            return Err(Error::Conflict(format!(
                "progress for word {} already exists",
                record.word_id
            )));
        }

        inner.next_record_id += 1;
        let mut stored = record.clone();
        stored.id = Some(inner.next_record_id);
        stored.revision = 0;
        inner.progress.insert(stored.word_id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, record: &ProgressRecord) -> Result<ProgressRecord> {
        let mut inner = self.inner.lock().await;
        let current = inner
            .progress
            .get_mut(&record.word_id)
            .ok_or_else(|| Error::NotFound(format!("progress for word {}", record.word_id)))?;

        if current.revision != record.revision {
            return Err(Error::Conflict(format!(
                "progress for word {} changed (revision {} != {})",
                record.word_id, current.revision, record.revision
            )));
        }

        let mut stored = record.clone();
        stored.id = current.id;
        stored.revision = current.revision + 1;
        *current = stored.clone();
        Ok(stored)
    }
}
