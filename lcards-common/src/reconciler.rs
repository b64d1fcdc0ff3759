//! Catalog/progress reconciliation and due selection
//!
//! `sync_missing` and the filters are pure; `sync_into` drives a
//! [`ProgressStore`] and is safe to run concurrently with itself.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::models::{ProgressRecord, ReviewCard, Word};
use crate::scheduler::initial_state;
use crate::store::ProgressStore;
use crate::{time, Result};

/// Outcome of a sync pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Records this pass created
    pub created: usize,
    /// Planned records another writer had already created
    pub already_present: usize,
}

/// Progress records that are due in the day containing `now`
///
/// A record is due when its next review lies in `[start_of_day, start_of_day + 24h)`
/// at the given reference offset. Input order is preserved.
pub fn due_today(records: &[ProgressRecord], now: DateTime<Utc>, offset: FixedOffset) -> Vec<ProgressRecord> {
    let (start, end) = time::day_window(now, offset);
    records
        .iter()
        .filter(|r| r.next_review >= start && r.next_review < end)
        .cloned()
        .collect()
}

/// Initial records for every catalog word that has none yet
///
/// Catalog order is preserved and a word listed twice is planned once.
pub fn sync_missing(catalog: &[Word], existing: &[ProgressRecord], now: DateTime<Utc>) -> Vec<ProgressRecord> {
    let mut tracked: HashSet<_> = existing.iter().map(|r| r.word_id).collect();
    catalog
        .iter()
        .filter(|word| tracked.insert(word.id))
        .map(|word| initial_state(word.id, now))
        .collect()
}

/// Create the missing progress records in `store`
///
/// A uniqueness conflict on insert means another caller created the record
/// first; it is counted in `already_present` and not reported as an error.
pub async fn sync_into<S>(store: &S, catalog: &[Word], now: DateTime<Utc>) -> Result<SyncReport>
where
    S: ProgressStore + ?Sized,
{
    let existing: Vec<ProgressRecord> = store
        .get_all()
        .await?
        .into_iter()
        .map(|card| card.progress)
        .collect();

    let mut report = SyncReport::default();
    for record in sync_missing(catalog, &existing, now) {
        match store.insert(&record).await {
            Ok(_) => report.created += 1,
            Err(e) if e.is_conflict() => {
                debug!("Progress for word {} created concurrently", record.word_id);
                report.already_present += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if report.created > 0 {
        info!("Created {} progress records", report.created);
    }
    Ok(report)
}

/// Cards whose category string equals `category` exactly
///
/// `"basic, shopping"` only matches `"basic, shopping"`, not `"shopping"`.
pub fn filter_by_category(cards: &[ReviewCard], category: &str) -> Vec<ReviewCard> {
    cards
        .iter()
        .filter(|card| card.word.category == category)
        .cloned()
        .collect()
}

/// Split a category label into normalized tags
///
/// Tags are comma separated, trimmed and lowercased; empty tags are dropped.
pub fn category_tags(category: &str) -> BTreeSet<String> {
    category
        .split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Cards whose category contains `tag` as one of its normalized tags
pub fn filter_by_tag(cards: &[ReviewCard], tag: &str) -> Vec<ReviewCard> {
    let wanted = tag.trim().to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }
    cards
        .iter()
        .filter(|card| category_tags(&card.word.category).contains(&wanted))
        .cloned()
        .collect()
}
