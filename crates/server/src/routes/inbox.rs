use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::inbox_item::{CreateInboxItem, InboxItem, InboxQuery, UpdateInboxItem};
use deployment::Deployment;
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{ApiJson, ApiQuery, IdParam, WithId, require_id},
};

const NOT_FOUND: &str = "Item not found";

/// GET /api/inbox
pub async fn get_inbox_items(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(query): ApiQuery<InboxQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<InboxItem>>>, ApiError> {
    let items = InboxItem::find_filtered(&deployment.db().pool, &query).await?;
    let total = items.len();
    Ok(ResponseJson(ApiResponse::success(items).with_total(total)))
}

/// POST /api/inbox
pub async fn create_inbox_item(
    State(deployment): State<DeploymentImpl>,
    ApiJson(payload): ApiJson<CreateInboxItem>,
) -> Result<ResponseJson<ApiResponse<InboxItem>>, ApiError> {
    payload.validate().map_err(ApiError::BadRequest)?;

    let item = InboxItem::create(&deployment.db().pool, payload, Uuid::new_v4()).await?;
    tracing::info!(item_id = %item.id, "Inbox item captured");

    Ok(ResponseJson(
        ApiResponse::success(item).with_message("Item added to inbox successfully"),
    ))
}

/// PUT /api/inbox
pub async fn update_inbox_item(
    State(deployment): State<DeploymentImpl>,
    ApiJson(payload): ApiJson<WithId<UpdateInboxItem>>,
) -> Result<ResponseJson<ApiResponse<InboxItem>>, ApiError> {
    let id = require_id(payload.id.as_deref(), NOT_FOUND)?;
    payload.changes.validate().map_err(ApiError::BadRequest)?;

    let item = InboxItem::update(&deployment.db().pool, id, payload.changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(ResponseJson(
        ApiResponse::success(item).with_message("Item updated successfully"),
    ))
}

/// DELETE /api/inbox?id=
pub async fn delete_inbox_item(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(params): ApiQuery<IdParam>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let id = require_id(params.id.as_deref(), NOT_FOUND)?;
    if InboxItem::delete(&deployment.db().pool, id).await? == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(ResponseJson(ApiResponse::message_only("Item deleted successfully")))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route(
        "/inbox",
        get(get_inbox_items)
            .post(create_inbox_item)
            .put(update_inbox_item)
            .delete(delete_inbox_item),
    )
}
