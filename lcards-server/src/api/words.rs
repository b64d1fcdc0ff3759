//! Word review endpoints
//!
//! Card lists are shuffled here, after the service has answered, so the order
//! clients see is never meaningful.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Json,
};
use lcards_common::reconciler::SyncReport;
use lcards_common::{ProgressRecord, ReviewCard, WordId};
use rand::seq::SliceRandom;
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use crate::AppState;

/// Body of `PUT /v1/words/update/:word_id`
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    /// True if the word was answered correctly
    pub learned: bool,
}

fn shuffled(mut cards: Vec<ReviewCard>) -> Vec<ReviewCard> {
    cards.shuffle(&mut rand::thread_rng());
    cards
}

/// GET /v1/words
pub async fn list_words(State(state): State<AppState>) -> ApiResult<Json<Vec<ReviewCard>>> {
    let cards = state.service.list_all().await?;
    Ok(Json(cards))
}

/// GET /v1/words/daily
pub async fn daily_words(State(state): State<AppState>) -> ApiResult<Json<Vec<ReviewCard>>> {
    let cards = state.service.get_due_today().await?;
    Ok(Json(shuffled(cards)))
}

/// GET /v1/words/category/:category
pub async fn words_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<ReviewCard>>> {
    let cards = state.service.get_by_category(&category).await?;
    Ok(Json(shuffled(cards)))
}

/// GET /v1/words/tag/:tag
pub async fn words_by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> ApiResult<Json<Vec<ReviewCard>>> {
    let cards = state.service.get_by_tag(&tag).await?;
    Ok(Json(shuffled(cards)))
}

/// PUT /v1/words/update/:word_id
pub async fn update_word(
    State(state): State<AppState>,
    word_id: Result<Path<WordId>, PathRejection>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> ApiResult<Json<ProgressRecord>> {
    let Path(word_id) = word_id.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let record = state
        .service
        .record_outcome(word_id, request.learned)
        .await?;
    Ok(Json(record))
}

/// POST /v1/sync
pub async fn sync_words(State(state): State<AppState>) -> ApiResult<Json<SyncReport>> {
    let report = state.service.run_sync().await?;
    Ok(Json(report))
}
