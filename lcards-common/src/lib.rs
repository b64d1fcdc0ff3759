//! # Learning Cards Common Library
//!
//! Core of the flashcard backend:
//! - Leitner-box review scheduling (`scheduler`)
//! - Catalog/progress reconciliation and due selection (`reconciler`)
//! - Catalog and progress store interfaces with in-memory and SQLite backends
//! - Catalog sources (seed list, CSV files)
//! - Configuration loading and time utilities

pub mod catalog;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod reconciler;
pub mod scheduler;
pub mod store;
pub mod time;

pub use error::{Error, Result};
pub use models::{NewWord, ProgressRecord, ReviewCard, Word, WordId};
pub use reconciler::SyncReport;
pub use store::{MemoryStore, ProgressStore, WordCatalog};
