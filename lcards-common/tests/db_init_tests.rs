//! Tests for database initialization
//!
//! Covers automatic creation, reopening an existing database and idempotent
//! schema setup.

use lcards_common::db::init::{init_database, SCHEMA_VERSION};
use lcards_common::db::words::{insert_words, list_words};
use lcards_common::NewWord;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("cards.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_tables_created() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("cards.db")).await.unwrap();

    for table in ["schema_version", "words", "progress"] {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1, "table {} missing", table);
    }

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_reopen_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cards.db");

    let pool1 = init_database(&db_path).await.unwrap();
    insert_words(&pool1, &[NewWord::new("cat", "gato", "animals")])
        .await
        .unwrap();
    pool1.close().await;

    // Second initialization must not drop or duplicate anything
    let pool2 = init_database(&db_path).await.unwrap();
    let words = list_words(&pool2).await.unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].text, "cat");

    let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(versions, 1);
}

#[tokio::test]
async fn test_box_number_constraint_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("cards.db")).await.unwrap();
    insert_words(&pool, &[NewWord::new("cat", "gato", "animals")])
        .await
        .unwrap();

    let result = sqlx::query(
        "INSERT INTO progress (word_id, box_number, last_review, next_review) VALUES (1, 6, 0, 0)",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err(), "box_number 6 should violate the CHECK constraint");
}
