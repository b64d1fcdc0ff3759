//! Catalog ingestion into SQLite
//!
//! Seed words and CSV files are inserted with `ON CONFLICT(text) DO NOTHING`,
//! so ingestion can run on every startup and on a timer.

use std::path::PathBuf;

use lcards_common::catalog::{load_csv_dir, seed_words};
use lcards_common::db::words::insert_words;
use lcards_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Where catalog words come from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSources {
    pub seed_words: bool,
    pub catalog_dir: Option<PathBuf>,
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Words newly added to the catalog
    pub inserted: u64,
    /// CSV files read successfully
    pub files: usize,
    /// CSV files skipped because they were malformed or unreadable
    pub failed_files: usize,
}

/// Insert all configured catalog sources
///
/// A malformed CSV file only drops that file; seed words and other files are
/// still ingested.
pub async fn ingest_catalog(pool: &SqlitePool, sources: &CatalogSources) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    if sources.seed_words {
        report.inserted += insert_words(pool, &seed_words()).await?;
    }

    if let Some(dir) = sources.catalog_dir.clone() {
        // Directory walking and CSV parsing are blocking
        let import = tokio::task::spawn_blocking(move || load_csv_dir(&dir))
            .await
            .map_err(|e| Error::Internal(format!("Catalog import task failed: {}", e)))??;

        for (path, e) in &import.failures {
            warn!("Catalog file {} not imported: {}", path.display(), e);
        }
        report.files = import.files.len();
        report.failed_files = import.failures.len();
        report.inserted += insert_words(pool, &import.words).await?;
    }

    if report.inserted > 0 {
        info!(
            "Catalog ingestion added {} words ({} files, {} skipped)",
            report.inserted, report.files, report.failed_files
        );
    }
    Ok(report)
}
