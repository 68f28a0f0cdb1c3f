use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::note::{
    CreateConnection, CreateNote, Note, NoteConnection, NoteDetail, NoteQuery, NoteStats,
    NoteWithConnections, UpdateNote,
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

const NOT_FOUND: &str = "Note not found";
const CONNECTION_NOT_FOUND: &str = "Connection not found";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeParams {
    pub note_id: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, TS)]
pub struct KnowledgeOverview {
    pub notes: Vec<NoteWithConnections>,
    pub connections: Vec<NoteConnection>,
    pub stats: NoteStats,
}

#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
pub enum KnowledgeView {
    Detail(NoteDetail),
    Overview(KnowledgeOverview),
}

/// GET /api/knowledge, or a single note with `?noteId=`
pub async fn get_knowledge(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(params): ApiQuery<KnowledgeParams>,
) -> Result<ResponseJson<ApiResponse<KnowledgeView>>, ApiError> {
    let pool = &deployment.db().pool;

    if let Some(raw) = params.note_id.as_deref().filter(|r| !r.trim().is_empty()) {
        let id = require_id(Some(raw), NOT_FOUND)?;
        let detail = Note::find_detail(pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
        return Ok(ResponseJson(ApiResponse::success(KnowledgeView::Detail(detail))));
    }

    let (all, connections) = Note::find_all_linked(pool).await?;
    let stats = NoteStats::compute(&all, connections.len());
    let query = NoteQuery {
        note_type: params.note_type,
        category: params.category,
        status: params.status,
        search: params.search,
    };
    let notes = query.filter().apply(all);
    let total = notes.len();

    Ok(ResponseJson(
        ApiResponse::success(KnowledgeView::Overview(KnowledgeOverview {
            notes,
            connections,
            stats,
        }))
        .with_total(total),
    ))
}

/// POST /api/knowledge
pub async fn create_note(
    State(deployment): State<DeploymentImpl>,
    ApiJson(payload): ApiJson<CreateNote>,
) -> Result<ResponseJson<ApiResponse<NoteWithConnections>>, ApiError> {
    payload.validate().map_err(ApiError::BadRequest)?;
    let note = Note::create(&deployment.db().pool, payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(
        ApiResponse::success(note).with_message("Note created successfully"),
    ))
}

/// PUT /api/knowledge
pub async fn update_note(
    State(deployment): State<DeploymentImpl>,
    ApiJson(payload): ApiJson<WithId<UpdateNote>>,
) -> Result<ResponseJson<ApiResponse<NoteWithConnections>>, ApiError> {
    let id = require_id(payload.id.as_deref(), NOT_FOUND)?;
    payload.changes.validate().map_err(ApiError::BadRequest)?;

    let note = Note::update(&deployment.db().pool, id, payload.changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    Ok(ResponseJson(
        ApiResponse::success(note).with_message("Note updated successfully"),
    ))
}

/// DELETE /api/knowledge?id=
pub async fn delete_note(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(params): ApiQuery<IdParam>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let id = require_id(params.id.as_deref(), NOT_FOUND)?;
    if Note::delete(&deployment.db().pool, id).await? == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    Ok(ResponseJson(ApiResponse::message_only("Note deleted successfully")))
}

#[derive(Debug, Deserialize)]
struct ConnectionBody {
    from: Option<String>,
    to: Option<String>,
    #[serde(rename = "type")]
    connection_type: Option<String>,
    strength: Option<i64>,
}

/// PATCH /api/knowledge with `action` = `create_connection` | `delete_connection`
pub async fn manage_connection(
    State(deployment): State<DeploymentImpl>,
    ApiJson(body): ApiJson<Value>,
) -> Result<ResponseJson<ApiResponse<NoteConnection>>, ApiError> {
    let action = body.get("action").and_then(Value::as_str).map(str::to_string);
    let parsed: ConnectionBody = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?;
    let pool = &deployment.db().pool;

    match action.as_deref() {
        Some("create_connection") => {
            let data = CreateConnection {
                from: require_id(parsed.from.as_deref(), NOT_FOUND)?,
                to: require_id(parsed.to.as_deref(), NOT_FOUND)?,
                connection_type: parsed.connection_type,
                strength: parsed.strength,
            };
            data.validate().map_err(ApiError::BadRequest)?;

            let connection = NoteConnection::create(pool, data).await?;
            tracing::info!(from = %connection.from_id, to = %connection.to_id, "Notes connected");
            Ok(ResponseJson(
                ApiResponse::success(connection)
                    .with_message("Connection created successfully"),
            ))
        }
        Some("delete_connection") => {
            let from = require_id(parsed.from.as_deref(), CONNECTION_NOT_FOUND)?;
            let to = require_id(parsed.to.as_deref(), CONNECTION_NOT_FOUND)?;
            NoteConnection::delete(pool, from, to).await?;
            Ok(ResponseJson(ApiResponse::message_only("Connection deleted successfully")))
        }
        _ => Err(ApiError::bad_request("Invalid action")),
    }
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route(
        "/knowledge",
        get(get_knowledge)
            .post(create_note)
            .put(update_note)
            .delete(delete_note)
            .patch(manage_connection),
    )
}
