//! Leitner-box review scheduling
//!
//! Pure functions mapping (box, outcome) to the next review state. Nothing in
//! here touches a store or the clock; callers pass `now` in.
//!
//! | Box | Interval after success |
//! |-----|------------------------|
//! | 1   | 1 day                  |
//! | 2   | 3 days                 |
//! | 3   | 7 days                 |
//! | 4   | 14 days                |
//! | 5   | 30 days                |
//!
//! A failed review always sends the word back to box 1, due again in one day.

use chrono::{DateTime, Duration, Utc};

use crate::models::{ProgressRecord, WordId};

/// Lowest Leitner box (new or just missed)
pub const MIN_BOX: u8 = 1;

/// Highest Leitner box (well learned)
pub const MAX_BOX: u8 = 5;

/// Review interval in days, indexed by `box - 1`
const INTERVAL_DAYS: [i64; MAX_BOX as usize] = [1, 3, 7, 14, 30];

/// Map a stored box number into `MIN_BOX..=MAX_BOX`
///
/// Anything out of range is treated as box 1.
pub fn normalize_box(box_number: u8) -> u8 {
    if (MIN_BOX..=MAX_BOX).contains(&box_number) {
        box_number
    } else {
        MIN_BOX
    }
}

/// Interval until the next review for a word that has just reached `box_number`
pub fn review_interval(box_number: u8) -> Duration {
    let index = usize::from(normalize_box(box_number) - MIN_BOX);
    Duration::days(INTERVAL_DAYS[index])
}

/// Box reached after a review with the given outcome
pub fn next_box(box_number: u8, passed: bool) -> u8 {
    if passed {
        (normalize_box(box_number) + 1).min(MAX_BOX)
    } else {
        MIN_BOX
    }
}

/// Progress for a word that has never been reviewed
///
/// The record is due immediately.
pub fn initial_state(word_id: WordId, now: DateTime<Utc>) -> ProgressRecord {
    ProgressRecord {
        id: None,
        word_id,
        box_number: MIN_BOX,
        last_review: now,
        next_review: now,
        correct_attempts: 0,
        incorrect_attempts: 0,
        revision: 0,
    }
}

/// Apply one review outcome to a record
///
/// Identity fields (`id`, `word_id`, `revision`) are carried over unchanged.
pub fn record_outcome(record: &ProgressRecord, passed: bool, now: DateTime<Utc>) -> ProgressRecord {
    let box_number = next_box(record.box_number, passed);
    let mut updated = record.clone();

    updated.box_number = box_number;
    updated.last_review = now;
    if passed {
        updated.correct_attempts = record.correct_attempts.saturating_add(1);
        updated.next_review = now + review_interval(box_number);
    } else {
        updated.incorrect_attempts = record.incorrect_attempts.saturating_add(1);
        updated.next_review = now + Duration::days(1);
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn record_in_box(box_number: u8) -> ProgressRecord {
        let earlier = at_noon() - Duration::days(2);
        ProgressRecord {
            id: Some(7),
            word_id: 42,
            box_number,
            last_review: earlier,
            next_review: earlier,
            correct_attempts: 3,
            incorrect_attempts: 2,
            revision: 4,
        }
    }

    #[test]
    fn test_failure_resets_every_box_to_one() {
        let now = at_noon();
        for b in MIN_BOX..=MAX_BOX {
            let updated = record_outcome(&record_in_box(b), false, now);
            assert_eq!(updated.box_number, 1, "box {} should reset", b);
            assert_eq!(updated.next_review, now + Duration::hours(24));
            assert_eq!(updated.last_review, now);
            assert_eq!(updated.incorrect_attempts, 3);
            assert_eq!(updated.correct_attempts, 3);
        }
    }

    #[test]
    fn test_success_promotes_and_uses_new_box_interval() {
        let now = at_noon();
        let expected_days = [(1u8, 3i64), (2, 7), (3, 14), (4, 30)];
        for (from, days) in expected_days {
            let updated = record_outcome(&record_in_box(from), true, now);
            assert_eq!(updated.box_number, from + 1);
            assert_eq!(updated.next_review, now + Duration::days(days));
            assert_eq!(updated.last_review, now);
            assert_eq!(updated.correct_attempts, 4);
            assert_eq!(updated.incorrect_attempts, 2);
        }
    }

    #[test]
    fn test_success_in_top_box_stays_in_top_box() {
        let now = at_noon();
        let updated = record_outcome(&record_in_box(5), true, now);
        assert_eq!(updated.box_number, 5);
        assert_eq!(updated.next_review, now + Duration::days(30));
    }

    #[test]
    fn test_identity_fields_are_preserved() {
        let original = record_in_box(2);
        let updated = record_outcome(&original, true, at_noon());
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.word_id, original.word_id);
        assert_eq!(updated.revision, original.revision);
    }

    #[test]
    fn test_out_of_range_box_is_treated_as_box_one() {
        let now = at_noon();

        let promoted = record_outcome(&record_in_box(0), true, now);
        assert_eq!(promoted.box_number, 2);
        assert_eq!(promoted.next_review, now + Duration::days(3));

        let promoted = record_outcome(&record_in_box(9), true, now);
        assert_eq!(promoted.box_number, 2);

        let failed = record_outcome(&record_in_box(200), false, now);
        assert_eq!(failed.box_number, 1);
    }

    #[test]
    fn test_review_interval_table() {
        assert_eq!(review_interval(1), Duration::days(1));
        assert_eq!(review_interval(2), Duration::days(3));
        assert_eq!(review_interval(3), Duration::days(7));
        assert_eq!(review_interval(4), Duration::days(14));
        assert_eq!(review_interval(5), Duration::days(30));
    }

    #[test]
    fn test_initial_state_is_due_now() {
        let now = at_noon();
        let record = initial_state(11, now);
        assert_eq!(record.word_id, 11);
        assert_eq!(record.id, None);
        assert_eq!(record.box_number, 1);
        assert_eq!(record.last_review, now);
        assert_eq!(record.next_review, now);
        assert_eq!(record.correct_attempts, 0);
        assert_eq!(record.incorrect_attempts, 0);
        assert_eq!(record.revision, 0);
    }

    #[test]
    fn test_counters_saturate() {
        let mut record = record_in_box(3);
        record.correct_attempts = u32::MAX;
        let updated = record_outcome(&record, true, at_noon());
        assert_eq!(updated.correct_attempts, u32::MAX);
    }
}
