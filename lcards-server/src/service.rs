//! Review operations exposed to the HTTP layer and the background sweep
//!
//! The service owns no state of its own: the catalog and progress store are
//! injected, and every operation has an `_at` variant taking the current time.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, FixedOffset, Utc};
use lcards_common::reconciler::{self, SyncReport};
use lcards_common::{
    scheduler, time, Error, ProgressRecord, ProgressStore, Result, ReviewCard, WordCatalog, WordId,
};
use rand::Rng;
use tracing::{debug, info, warn};

/// Upper bound of the randomized pause between lost compare-and-swap rounds
const MAX_RETRY_BACKOFF_MS: u64 = 20;

/// Conflicts on one outcome before it is logged as contended
const CONTENDED_ATTEMPTS: u32 = 8;

pub struct ReviewService {
    catalog: Arc<dyn WordCatalog>,
    store: Arc<dyn ProgressStore>,
    day_offset: FixedOffset,
}

impl ReviewService {
    /// `day_offset` fixes where "today" starts relative to UTC
    pub fn new(
        catalog: Arc<dyn WordCatalog>,
        store: Arc<dyn ProgressStore>,
        day_offset: FixedOffset,
    ) -> Self {
        Self {
            catalog,
            store,
            day_offset,
        }
    }

    /// Sync, then return every card due today
    pub async fn get_due_today(&self) -> Result<Vec<ReviewCard>> {
        self.get_due_today_at(time::now()).await
    }

    pub async fn get_due_today_at(&self, now: DateTime<Utc>) -> Result<Vec<ReviewCard>> {
        self.run_sync_at(now).await?;
        let (start, end) = time::day_window(now, self.day_offset);
        let cards = self.store.get_due_in_range(start, end).await?;
        debug!("{} cards due between {} and {}", cards.len(), start, end);
        Ok(cards)
    }

    /// Cards whose category label equals `category` exactly
    pub async fn get_by_category(&self, category: &str) -> Result<Vec<ReviewCard>> {
        self.store.get_by_category(category).await
    }

    /// Cards carrying `tag` among their normalized category tags
    ///
    /// A blank tag is rejected with `InvalidInput`.
    pub async fn get_by_tag(&self, tag: &str) -> Result<Vec<ReviewCard>> {
        if tag.trim().is_empty() {
            return Err(Error::InvalidInput("tag must not be blank".to_string()));
        }
        let cards = self.store.get_all().await?;
        Ok(reconciler::filter_by_tag(&cards, tag))
    }

    pub async fn list_all(&self) -> Result<Vec<ReviewCard>> {
        self.store.get_all().await
    }

    /// Record a pass/fail review for a word
    pub async fn record_outcome(&self, word_id: WordId, passed: bool) -> Result<ProgressRecord> {
        self.record_outcome_at(word_id, passed, time::now()).await
    }

    /// Read, schedule and compare-and-swap; re-read on a lost race
    ///
    /// Every lost race means another outcome for the same word was stored,
    /// so the loop always makes progress and retries until this outcome is
    /// applied on top of the latest record. Fails with `NotFound` if the word
    /// has no progress record.
    pub async fn record_outcome_at(
        &self,
        word_id: WordId,
        passed: bool,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let current = self
                .store
                .get_by_word_id(word_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("progress for word {}", word_id)))?;
            let updated = scheduler::record_outcome(&current, passed, now);

            match self.store.update(&updated).await {
                Ok(stored) => {
                    info!(
                        "Word {} {}: box {} -> {}, next review {}",
                        word_id,
                        if passed { "passed" } else { "failed" },
                        current.box_number,
                        stored.box_number,
                        stored.next_review
                    );
                    return Ok(stored);
                }
                Err(e) if e.is_conflict() => {
                    if attempt == CONTENDED_ATTEMPTS {
                        warn!(
                            "Outcome for word {} lost {} races, still retrying",
                            word_id, attempt
                        );
                    } else {
                        debug!(
                            "Retrying outcome for word {} after conflict (attempt {})",
                            word_id, attempt
                        );
                    }
                    retry_pause().await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Create progress records for catalog words that have none
    pub async fn run_sync(&self) -> Result<SyncReport> {
        self.run_sync_at(time::now()).await
    }

    pub async fn run_sync_at(&self, now: DateTime<Utc>) -> Result<SyncReport> {
        let catalog = self.catalog.all_words().await?;
        reconciler::sync_into(self.store.as_ref(), &catalog, now).await
    }
}

/// Randomized pause so writers racing on one record stop colliding in step
async fn retry_pause() {
    let millis = rand::thread_rng().gen_range(0..=MAX_RETRY_BACKOFF_MS);
    if millis == 0 {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(StdDuration::from_millis(millis)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use lcards_common::{MemoryStore, NewWord};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 20, 12, 0, 0).unwrap()
    }

    async fn service_with(words: Vec<NewWord>) -> (Arc<MemoryStore>, ReviewService) {
        let store = Arc::new(MemoryStore::new());
        store.add_words(words).await;
        let service = ReviewService::new(store.clone(), store.clone(), utc());
        (store, service)
    }

    fn abc() -> Vec<NewWord> {
        vec![
            NewWord::new("A", "a", "animals"),
            NewWord::new("B", "b", "animals, nature"),
            NewWord::new("C", "c", "food"),
        ]
    }

    #[tokio::test]
    async fn test_due_today_syncs_missing_words_and_includes_record_due_earlier() {
        let (store, service) = service_with(abc()).await;
        let now = noon();
        let catalog = store.all_words().await.unwrap();

        // Only A is tracked; it was reviewed yesterday and came due earlier today
        let mut a = scheduler::initial_state(catalog[0].id, now - Duration::days(1));
        a.next_review = now - Duration::hours(2);
        store.insert(&a).await.unwrap();

        let due = service.get_due_today_at(now).await.unwrap();
        let mut texts: Vec<_> = due.iter().map(|c| c.word.text.clone()).collect();
        texts.sort();
        assert_eq!(texts, vec!["A", "B", "C"]);
        assert_eq!(store.progress_count().await, 3);
    }

    #[tokio::test]
    async fn test_record_due_before_today_is_not_in_todays_set() {
        let (store, service) = service_with(abc()).await;
        let now = noon();
        let catalog = store.all_words().await.unwrap();

        let mut a = scheduler::initial_state(catalog[0].id, now - Duration::days(2));
        a.next_review = now - Duration::days(1);
        store.insert(&a).await.unwrap();

        let due = service.get_due_today_at(now).await.unwrap();
        let texts: Vec<_> = due.iter().map(|c| c.word.text.as_str()).collect();
        assert_eq!(texts, vec!["B", "C"]);
        assert_eq!(store.progress_count().await, 3);
    }

    #[tokio::test]
    async fn test_record_outcome_unknown_word_is_not_found() {
        let (_store, service) = service_with(abc()).await;
        let err = service.record_outcome_at(42, true, noon()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_record_outcome_persists_transition() {
        let (store, service) = service_with(abc()).await;
        service.run_sync_at(noon()).await.unwrap();
        let word_id = store.all_words().await.unwrap()[1].id;

        let later = noon() + Duration::hours(1);
        let passed = service.record_outcome_at(word_id, true, later).await.unwrap();
        assert_eq!(passed.box_number, 2);
        assert_eq!(passed.next_review, later + Duration::days(3));
        assert_eq!(passed.revision, 1);

        let failed = service.record_outcome_at(word_id, false, later).await.unwrap();
        assert_eq!(failed.box_number, 1);
        assert_eq!(failed.incorrect_attempts, 1);
        assert_eq!(failed.correct_attempts, 1);

        let stored = store.get_by_word_id(word_id).await.unwrap().unwrap();
        assert_eq!(stored, failed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_outcomes_are_not_lost() {
        let (store, service) = service_with(abc()).await;
        service.run_sync_at(noon()).await.unwrap();
        let word_id = store.all_words().await.unwrap()[0].id;
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.record_outcome_at(word_id, false, noon()).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.get_by_word_id(word_id).await.unwrap().unwrap();
        assert_eq!(stored.incorrect_attempts, 16);
        assert_eq!(stored.revision, 16);
        assert_eq!(stored.box_number, 1);
    }

    #[tokio::test]
    async fn test_category_and_tag_lookups() {
        let (_store, service) = service_with(abc()).await;
        service.run_sync_at(noon()).await.unwrap();

        let literal: Vec<_> = service
            .get_by_category("animals")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.word.text)
            .collect();
        assert_eq!(literal, vec!["A"]);

        let tagged: Vec<_> = service
            .get_by_tag("animals")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.word.text)
            .collect();
        assert_eq!(tagged, vec!["A", "B"]);

        let err = service.get_by_tag("  ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    /// Store whose first updates lose the race
    struct StaleFor {
        inner: MemoryStore,
        stale_updates: u32,
        updates: AtomicU32,
    }

    #[async_trait]
    impl ProgressStore for StaleFor {
        async fn get_all(&self) -> Result<Vec<ReviewCard>> {
            self.inner.get_all().await
        }
        async fn get_by_word_id(&self, word_id: WordId) -> Result<Option<ProgressRecord>> {
            self.inner.get_by_word_id(word_id).await
        }
        async fn get_due_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<ReviewCard>> {
            self.inner.get_due_in_range(start, end).await
        }
        async fn get_by_category(&self, category: &str) -> Result<Vec<ReviewCard>> {
            self.inner.get_by_category(category).await
        }
        async fn insert(&self, record: &ProgressRecord) -> Result<ProgressRecord> {
            self.inner.insert(record).await
        }
        async fn update(&self, record: &ProgressRecord) -> Result<ProgressRecord> {
            if self.updates.fetch_add(1, Ordering::SeqCst) < self.stale_updates {
                return Err(Error::Conflict("stale".to_string()));
            }
            self.inner.update(record).await
        }
    }

    #[tokio::test]
    async fn test_record_outcome_keeps_retrying_past_many_conflicts() {
        let store = Arc::new(StaleFor {
            inner: MemoryStore::new(),
            stale_updates: 12,
            updates: AtomicU32::new(0),
        });
        let word = store.inner.add_word(NewWord::new("x", "y", "z")).await;
        store
            .inner
            .insert(&scheduler::initial_state(word.id, noon()))
            .await
            .unwrap();

        let catalog = Arc::new(MemoryStore::new());
        let service = ReviewService::new(catalog, store.clone(), utc());

        let stored = service.record_outcome_at(word.id, true, noon()).await.unwrap();
        assert_eq!(stored.box_number, 2);
        assert_eq!(stored.revision, 1);
        assert_eq!(store.updates.load(Ordering::SeqCst), 13);
    }
}
