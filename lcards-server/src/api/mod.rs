//! HTTP API handlers for lcards-server

pub mod buildinfo;
pub mod error;
pub mod health;
pub mod words;

pub use buildinfo::get_build_info;
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
pub use words::{daily_words, list_words, sync_words, update_word, words_by_category, words_by_tag};
