use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use chrono::Utc;
use db::models::flashcard::{
    CreateFlashcard, Flashcard, FlashcardQuery, FlashcardStats, Rating, ReviewOutcome,
    UpdateFlashcard,
};
use deployment::Deployment;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{ApiJson, ApiQuery, IdParam, WithId, require_id},
};

const NOT_FOUND: &str = "Flashcard not found";
const CARD_NOT_FOUND: &str = "Card not found";

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DeckOverview {
    pub cards: Vec<Flashcard>,
    pub stats: FlashcardStats,
    pub due_cards: Vec<Flashcard>,
}

/// GET /api/spaced-repetition
pub async fn get_cards(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(query): ApiQuery<FlashcardQuery>,
) -> Result<ResponseJson<ApiResponse<DeckOverview>>, ApiError> {
    let now = Utc::now();
    let all = Flashcard::find_all(&deployment.db().pool).await?;
    let stats = FlashcardStats::compute(&all, now);
    let mut due_cards: Vec<Flashcard> = all.iter().filter(|c| c.is_due(now)).cloned().collect();
    due_cards.sort_by_key(|c| c.due_date);

    let cards = query.filter(now).apply(all);
    let total = cards.len();
    Ok(ResponseJson(
        ApiResponse::success(DeckOverview {
            cards,
            stats,
            due_cards,
        })
        .with_total(total),
    ))
}

/// POST /api/spaced-repetition
pub async fn create_card(
    State(deployment): State<DeploymentImpl>,
    ApiJson(payload): ApiJson<CreateFlashcard>,
) -> Result<ResponseJson<ApiResponse<Flashcard>>, ApiError> {
    payload.validate().map_err(ApiError::BadRequest)?;
    let card = Flashcard::create(&deployment.db().pool, payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(
        ApiResponse::success(card).with_message("Flashcard created successfully"),
    ))
}

/// PUT /api/spaced-repetition
pub async fn update_card(
    State(deployment): State<DeploymentImpl>,
    ApiJson(payload): ApiJson<WithId<UpdateFlashcard>>,
) -> Result<ResponseJson<ApiResponse<Flashcard>>, ApiError> {
    let id = require_id(payload.id.as_deref(), NOT_FOUND)?;
    payload.changes.validate().map_err(ApiError::BadRequest)?;

    let card = Flashcard::update(&deployment.db().pool, id, payload.changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    Ok(ResponseJson(
        ApiResponse::success(card).with_message("Flashcard updated successfully"),
    ))
}

/// DELETE /api/spaced-repetition?id=
pub async fn delete_card(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(params): ApiQuery<IdParam>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let id = require_id(params.id.as_deref(), NOT_FOUND)?;
    if Flashcard::delete(&deployment.db().pool, id).await? == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(ResponseJson(ApiResponse::message_only("Flashcard deleted successfully")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewBody {
    card_id: Option<String>,
    rating: Option<Rating>,
    #[serde(default)]
    response_time: i64,
}

#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
pub enum ReviewAction {
    Reviewed(ReviewOutcome),
    Card(Option<Flashcard>),
}

/// PATCH /api/spaced-repetition with `action` = `submit_review` | `get_next_card` | `reset_card`
pub async fn review_action(
    State(deployment): State<DeploymentImpl>,
    ApiJson(body): ApiJson<Value>,
) -> Result<ResponseJson<ApiResponse<ReviewAction>>, ApiError> {
    let action = body.get("action").and_then(Value::as_str).map(str::to_string);
    let parsed: ReviewBody = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?;
    let pool = &deployment.db().pool;

    match action.as_deref() {
        Some("submit_review") => {
            let id = require_id(parsed.card_id.as_deref(), CARD_NOT_FOUND)?;
            let rating = parsed
                .rating
                .ok_or_else(|| ApiError::bad_request("Rating is required"))?;
            let outcome = Flashcard::submit_review(pool, id, rating, parsed.response_time.max(0))
                .await?
                .ok_or_else(|| ApiError::not_found(CARD_NOT_FOUND))?;
            tracing::info!(
                card_id = %id,
                %rating,
                interval = outcome.updated_card.interval,
                "Flashcard reviewed"
            );
            Ok(ResponseJson(
                ApiResponse::success(ReviewAction::Reviewed(outcome))
                    .with_message("Review submitted successfully"),
            ))
        }
        Some("get_next_card") => {
            let next = Flashcard::find_next_due(pool, Utc::now()).await?;
            let message = if next.is_some() {
                "Next card retrieved successfully"
            } else {
                "No cards due for review"
            };
            Ok(ResponseJson(
                ApiResponse::success(ReviewAction::Card(next)).with_message(message),
            ))
        }
        Some("reset_card") => {
            let id = require_id(parsed.card_id.as_deref(), CARD_NOT_FOUND)?;
            let card = Flashcard::reset_schedule(pool, id)
                .await?
                .ok_or_else(|| ApiError::not_found(CARD_NOT_FOUND))?;
            Ok(ResponseJson(
                ApiResponse::success(ReviewAction::Card(Some(card)))
                    .with_message("Card reset successfully"),
            ))
        }
        _ => Err(ApiError::bad_request("Invalid action")),
    }
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route(
        "/spaced-repetition",
        get(get_cards)
            .post(create_card)
            .put(update_card)
            .delete(delete_card)
            .patch(review_action),
    )
}
