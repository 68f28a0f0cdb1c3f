use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::life_area::{
    AreaItem, AreaReview, CreateAreaReview, CreateGoal, CreateHabit, CreateLifeArea, Goal, Habit,
    LifeArea, LifeAreaQuery, LifeAreaStats, LifeAreaWithItems, UpdateGoal, UpdateHabit,
    UpdateLifeArea,
};
use deployment::Deployment;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use ts_rs::TS;
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{ApiJson, ApiQuery, require_id},
};

const NOT_FOUND: &str = "Life area not found";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeAreaParams {
    pub area_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, TS)]
pub struct LifeAreaOverview {
    pub areas: Vec<LifeAreaWithItems>,
    pub stats: LifeAreaStats,
}

#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
pub enum LifeAreaView {
    Detail(LifeAreaWithItems),
    Overview(LifeAreaOverview),
}

/// GET /api/life-areas, or one area with `?areaId=`
pub async fn get_life_areas(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(params): ApiQuery<LifeAreaParams>,
) -> Result<ResponseJson<ApiResponse<LifeAreaView>>, ApiError> {
    let pool = &deployment.db().pool;

    if let Some(raw) = params.area_id.as_deref().filter(|r| !r.trim().is_empty()) {
        let id = require_id(Some(raw), NOT_FOUND)?;
        let area = LifeArea::find_with_items(pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
        return Ok(ResponseJson(ApiResponse::success(LifeAreaView::Detail(area))));
    }

    let all = LifeArea::find_all_with_items(pool).await?;
    let stats = LifeAreaStats::compute(&all);
    let areas = LifeAreaQuery { search: params.search }.filter().apply(all);
    let total = areas.len();

    Ok(ResponseJson(
        ApiResponse::success(LifeAreaView::Overview(LifeAreaOverview { areas, stats }))
            .with_total(total),
    ))
}

/// Anything a POST or PUT on this route can return.
#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
pub enum LifeAreaChange {
    Area(LifeAreaWithItems),
    UpdatedArea(LifeArea),
    Goal(Goal),
    Habit(Habit),
    Review(AreaReview),
}

fn field<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T, ApiError> {
    let value = body.get(key).cloned().unwrap_or(Value::Object(Default::default()));
    serde_json::from_value(value).map_err(|e| ApiError::bad_request(format!("Invalid {key}: {e}")))
}

fn id_field(body: &Value, key: &str, not_found: &str) -> Result<Uuid, ApiError> {
    require_id(body.get(key).and_then(Value::as_str), not_found)
}

fn reply(change: LifeAreaChange, message: &str) -> ResponseJson<ApiResponse<LifeAreaChange>> {
    ResponseJson(ApiResponse::success(change).with_message(message))
}

/// POST /api/life-areas with `action` = `create_area` | `add_goal` | `add_habit` | `add_review`
pub async fn create_item(
    State(deployment): State<DeploymentImpl>,
    ApiJson(body): ApiJson<Value>,
) -> Result<ResponseJson<ApiResponse<LifeAreaChange>>, ApiError> {
    let pool = &deployment.db().pool;
    let action = body.get("action").and_then(Value::as_str).unwrap_or_default();

    match action {
        "create_area" => {
            let data: CreateLifeArea = serde_json::from_value(body.clone())
                .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?;
            data.validate().map_err(ApiError::BadRequest)?;
            let area = LifeArea::create(pool, data, Uuid::new_v4()).await?;
            tracing::info!(area_id = %area.area.id, "Life area created");
            Ok(reply(LifeAreaChange::Area(area), "Life area created successfully"))
        }
        "add_goal" => {
            let area_id = id_field(&body, "areaId", NOT_FOUND)?;
            let data: CreateGoal = field(&body, "goalData")?;
            data.validate().map_err(ApiError::BadRequest)?;
            let goal = Goal::create(pool, area_id, data, Uuid::new_v4()).await?;
            Ok(reply(LifeAreaChange::Goal(goal), "Goal added successfully"))
        }
        "add_habit" => {
            let area_id = id_field(&body, "areaId", NOT_FOUND)?;
            let data: CreateHabit = field(&body, "habitData")?;
            data.validate().map_err(ApiError::BadRequest)?;
            let habit = Habit::create(pool, area_id, data, Uuid::new_v4()).await?;
            Ok(reply(LifeAreaChange::Habit(habit), "Habit added successfully"))
        }
        "add_review" => {
            let area_id = id_field(&body, "areaId", NOT_FOUND)?;
            let data: CreateAreaReview = field(&body, "reviewData")?;
            data.validate().map_err(ApiError::BadRequest)?;
            let review = AreaReview::create(pool, area_id, data, Uuid::new_v4()).await?;
            Ok(reply(LifeAreaChange::Review(review), "Review added successfully"))
        }
        _ => Err(ApiError::bad_request("Invalid action")),
    }
}

/// PUT /api/life-areas with `action` = `update_area` | `update_goal` | `update_habit`
pub async fn update_item(
    State(deployment): State<DeploymentImpl>,
    ApiJson(body): ApiJson<Value>,
) -> Result<ResponseJson<ApiResponse<LifeAreaChange>>, ApiError> {
    let pool = &deployment.db().pool;
    let action = body.get("action").and_then(Value::as_str).unwrap_or_default();

    match action {
        "update_area" => {
            let area_id = id_field(&body, "areaId", NOT_FOUND)?;
            let changes: UpdateLifeArea = field(&body, "updates")?;
            changes.validate().map_err(ApiError::BadRequest)?;
            let area = LifeArea::update(pool, area_id, changes)
                .await?
                .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
            Ok(reply(LifeAreaChange::UpdatedArea(area), "Life area updated successfully"))
        }
        "update_goal" => {
            let area_id = id_field(&body, "areaId", NOT_FOUND)?;
            let goal_id = id_field(&body, "goalId", "Goal not found")?;
            let changes: UpdateGoal = field(&body, "updates")?;
            changes.validate().map_err(ApiError::BadRequest)?;
            let goal = Goal::update(pool, area_id, goal_id, changes).await?;
            Ok(reply(LifeAreaChange::Goal(goal), "Goal updated successfully"))
        }
        "update_habit" => {
            let area_id = id_field(&body, "areaId", NOT_FOUND)?;
            let habit_id = id_field(&body, "habitId", "Habit not found")?;
            let changes: UpdateHabit = field(&body, "updates")?;
            changes.validate().map_err(ApiError::BadRequest)?;
            let habit = Habit::update(pool, area_id, habit_id, changes).await?;
            Ok(reply(LifeAreaChange::Habit(habit), "Habit updated successfully"))
        }
        _ => Err(ApiError::bad_request("Invalid action")),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    pub action: Option<String>,
    pub area_id: Option<String>,
    pub item_id: Option<String>,
}

/// DELETE /api/life-areas?action=&areaId=&itemId=
pub async fn delete_item(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(params): ApiQuery<DeleteParams>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let pool = &deployment.db().pool;
    let non_blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
    let (Some(action), Some(raw_area)) = (non_blank(&params.action), non_blank(&params.area_id))
    else {
        return Err(ApiError::bad_request("Action and areaId are required"));
    };

    let area_id = require_id(Some(raw_area.as_str()), NOT_FOUND)?;
    if !LifeArea::exists(pool, area_id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    let item_id = non_blank(&params.item_id);
    let (item, message) = match (action.as_str(), item_id.is_some()) {
        ("delete_area", _) => {
            LifeArea::delete(pool, area_id).await?;
            tracing::info!(%area_id, "Life area deleted");
            return Ok(ResponseJson(ApiResponse::message_only("Life area deleted successfully")));
        }
        ("delete_goal", true) => (AreaItem::Goal, "Goal deleted successfully"),
        ("delete_habit", true) => (AreaItem::Habit, "Habit deleted successfully"),
        ("delete_review", true) => (AreaItem::Review, "Review deleted successfully"),
        _ => return Err(ApiError::bad_request("Invalid action or missing itemId")),
    };

    let not_found = match item {
        AreaItem::Goal => "Goal not found",
        AreaItem::Habit => "Habit not found",
        AreaItem::Review => "Review not found",
    };
    let item_id = require_id(item_id.as_deref(), not_found)?;
    LifeArea::delete_item(pool, area_id, item, item_id).await?;
    Ok(ResponseJson(ApiResponse::message_only(message)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route(
        "/life-areas",
        get(get_life_areas)
            .post(create_item)
            .put(update_item)
            .delete(delete_item),
    )
}
