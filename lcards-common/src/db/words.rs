//! Word catalog persistence

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::models::{NewWord, Word};
use crate::{time, Error, Result};

/// Insert catalog words, skipping any whose text already exists
///
/// Returns the number of words actually inserted.
pub async fn insert_words(pool: &SqlitePool, words: &[NewWord]) -> Result<u64> {
    let created_at = time::to_millis(time::now());
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for word in words {
        let result = sqlx::query(
            r#"
            INSERT INTO words (text, translation, category, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(text) DO NOTHING
            "#,
        )
        .bind(&word.text)
        .bind(&word.translation)
        .bind(&word.category)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Load every word ordered by id
pub async fn list_words(pool: &SqlitePool) -> Result<Vec<Word>> {
    let rows = sqlx::query(
        r#"
        SELECT id, text, translation, category, created_at
        FROM words
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(word_from_row).collect()
}

/// Count catalog words
pub async fn count_words(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn word_from_row(row: &SqliteRow) -> Result<Word> {
    let created_at: i64 = row.get("created_at");
    Ok(Word {
        id: row.get("id"),
        text: row.get("text"),
        translation: row.get("translation"),
        category: row.get("category"),
        created_at: time::from_millis(created_at)
            .ok_or_else(|| Error::Internal(format!("invalid created_at: {}", created_at)))?,
    })
}
