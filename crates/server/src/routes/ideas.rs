use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::idea::{CreateIdea, Idea, IdeaQuery, IdeaStats, Quadrants, UpdateIdea};
use deployment::Deployment;
use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{ApiJson, ApiQuery, IdParam, WithId, require_id},
};

const NOT_FOUND: &str = "Idea not found";

/// Filtered ideas and their quadrants; `stats` always covers the whole garden.
#[derive(Debug, Serialize, TS)]
pub struct IdeasOverview {
    pub ideas: Vec<Idea>,
    pub quadrants: Quadrants,
    pub stats: IdeaStats,
}

/// GET /api/ideas
pub async fn get_ideas(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(query): ApiQuery<IdeaQuery>,
) -> Result<ResponseJson<ApiResponse<IdeasOverview>>, ApiError> {
    let all = Idea::find_all(&deployment.db().pool).await?;
    let stats = IdeaStats::from_ideas(&all);
    let ideas = query.filter().apply(all);
    let quadrants = Quadrants::from_ideas(&ideas);
    let total = ideas.len();

    Ok(ResponseJson(
        ApiResponse::success(IdeasOverview {
            ideas,
            quadrants,
            stats,
        })
        .with_total(total),
    ))
}

/// POST /api/ideas
pub async fn create_idea(
    State(deployment): State<DeploymentImpl>,
    ApiJson(payload): ApiJson<CreateIdea>,
) -> Result<ResponseJson<ApiResponse<Idea>>, ApiError> {
    payload.validate().map_err(ApiError::BadRequest)?;
    let idea = Idea::create(&deployment.db().pool, payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(
        ApiResponse::success(idea).with_message("Idea created successfully"),
    ))
}

/// PUT /api/ideas
pub async fn update_idea(
    State(deployment): State<DeploymentImpl>,
    ApiJson(payload): ApiJson<WithId<UpdateIdea>>,
) -> Result<ResponseJson<ApiResponse<Idea>>, ApiError> {
    let id = require_id(payload.id.as_deref(), NOT_FOUND)?;
    payload.changes.validate().map_err(ApiError::BadRequest)?;

    let idea = Idea::update(&deployment.db().pool, id, payload.changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    Ok(ResponseJson(
        ApiResponse::success(idea).with_message("Idea updated successfully"),
    ))
}

/// DELETE /api/ideas?id=
pub async fn delete_idea(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(params): ApiQuery<IdParam>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let id = require_id(params.id.as_deref(), NOT_FOUND)?;
    if Idea::delete(&deployment.db().pool, id).await? == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(ResponseJson(ApiResponse::message_only("Idea deleted successfully")))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route(
        "/ideas",
        get(get_ideas).post(create_idea).put(update_idea).delete(delete_idea),
    )
}
