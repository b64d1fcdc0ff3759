//! Progress record persistence
//!
//! Reads join each record with its word. Updates are compare-and-swap on the
//! `revision` column, so a concurrent writer can never be silently overwritten.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::models::{ProgressRecord, ReviewCard, Word, WordId};
use crate::{time, Error, Result};

const CARD_COLUMNS: &str = r#"
    SELECT p.id, p.word_id, p.box_number, p.last_review, p.next_review,
           p.correct_attempts, p.incorrect_attempts, p.revision,
           w.text, w.translation, w.category, w.created_at
    FROM progress p
    JOIN words w ON w.id = p.word_id
"#;

/// Load every card ordered by record id
pub async fn load_all_cards(pool: &SqlitePool) -> Result<Vec<ReviewCard>> {
    let sql = format!("{} ORDER BY p.id", CARD_COLUMNS);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(card_from_row).collect()
}

/// Load cards whose next review lies in `[start, end)`
pub async fn load_cards_due_between(
    pool: &SqlitePool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<ReviewCard>> {
    let sql = format!(
        "{} WHERE p.next_review >= ? AND p.next_review < ? ORDER BY p.id",
        CARD_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(time::to_millis(start))
        .bind(time::to_millis(end))
        .fetch_all(pool)
        .await?;
    rows.iter().map(card_from_row).collect()
}

/// Load cards whose word category equals `category` exactly
pub async fn load_cards_by_category(pool: &SqlitePool, category: &str) -> Result<Vec<ReviewCard>> {
    let sql = format!("{} WHERE w.category = ? ORDER BY p.id", CARD_COLUMNS);
    let rows = sqlx::query(&sql).bind(category).fetch_all(pool).await?;
    rows.iter().map(card_from_row).collect()
}

/// Load the progress record for one word
pub async fn load_progress_by_word(
    pool: &SqlitePool,
    word_id: WordId,
) -> Result<Option<ProgressRecord>> {
    let row = sqlx::query(
        r#"
        SELECT id, word_id, box_number, last_review, next_review,
               correct_attempts, incorrect_attempts, revision
        FROM progress
        WHERE word_id = ?
        "#,
    )
    .bind(word_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(progress_from_row).transpose()
}

/// Insert a new progress record
///
/// A second record for the same word fails with [`Error::Conflict`]; an
/// unknown word fails with [`Error::NotFound`].
pub async fn insert_progress(pool: &SqlitePool, record: &ProgressRecord) -> Result<ProgressRecord> {
    let result = sqlx::query(
        r#"
        INSERT INTO progress (
            word_id, box_number, last_review, next_review,
            correct_attempts, incorrect_attempts, revision
        ) VALUES (?, ?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(record.word_id)
    .bind(i64::from(record.box_number))
    .bind(time::to_millis(record.last_review))
    .bind(time::to_millis(record.next_review))
    .bind(i64::from(record.correct_attempts))
    .bind(i64::from(record.incorrect_attempts))
    .execute(pool)
    .await;

    match result {
        Ok(done) => {
            let mut stored = record.clone();
            stored.id = Some(done.last_insert_rowid());
            stored.revision = 0;
            Ok(stored)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(Error::Conflict(
            format!("progress for word {} already exists", record.word_id),
        )),
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            Err(Error::NotFound(format!("word {}", record.word_id)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Compare-and-swap update of every mutable field
///
/// Writes only if the stored revision equals `record.revision`, bumping it by one.
pub async fn update_progress(pool: &SqlitePool, record: &ProgressRecord) -> Result<ProgressRecord> {
    let result = sqlx::query(
        r#"
        UPDATE progress
        SET box_number = ?,
            last_review = ?,
            next_review = ?,
            correct_attempts = ?,
            incorrect_attempts = ?,
            revision = revision + 1
        WHERE word_id = ? AND revision = ?
        "#,
    )
    .bind(i64::from(record.box_number))
    .bind(time::to_millis(record.last_review))
    .bind(time::to_millis(record.next_review))
    .bind(i64::from(record.correct_attempts))
    .bind(i64::from(record.incorrect_attempts))
    .bind(record.word_id)
    .bind(record.revision)
    .execute(pool)
    .await?;

    if result.rows_affected() == 1 {
        let mut stored = record.clone();
        stored.revision = record.revision + 1;
        return Ok(stored);
    }

    // Nothing written: either the record is gone or someone else got there first
    match load_progress_by_word(pool, record.word_id).await? {
        Some(current) => Err(Error::Conflict(format!(
            "progress for word {} changed (revision {} != {})",
            record.word_id, current.revision, record.revision
        ))),
        None => Err(Error::NotFound(format!("progress for word {}", record.word_id))),
    }
}

fn timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let millis: i64 = row.get(column);
    time::from_millis(millis)
        .ok_or_else(|| Error::Internal(format!("invalid {} timestamp: {}", column, millis)))
}

fn counter(row: &SqliteRow, column: &str) -> Result<u32> {
    let value: i64 = row.get(column);
    u32::try_from(value).map_err(|_| Error::Internal(format!("invalid {}: {}", column, value)))
}

fn progress_from_row(row: &SqliteRow) -> Result<ProgressRecord> {
    let box_number: i64 = row.get("box_number");
    Ok(ProgressRecord {
        id: Some(row.get("id")),
        word_id: row.get("word_id"),
        box_number: u8::try_from(box_number)
            .map_err(|_| Error::Internal(format!("invalid box_number: {}", box_number)))?,
        last_review: timestamp(row, "last_review")?,
        next_review: timestamp(row, "next_review")?,
        correct_attempts: counter(row, "correct_attempts")?,
        incorrect_attempts: counter(row, "incorrect_attempts")?,
        revision: row.get("revision"),
    })
}

fn card_from_row(row: &SqliteRow) -> Result<ReviewCard> {
    let progress = progress_from_row(row)?;
    let word = Word {
        id: progress.word_id,
        text: row.get("text"),
        translation: row.get("translation"),
        category: row.get("category"),
        created_at: timestamp(row, "created_at")?,
    };
    Ok(ReviewCard { progress, word })
}
