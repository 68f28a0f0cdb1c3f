//! Tasks and projects share one endpoint; `itemType` picks the collection.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::{
    project::{CreateProject, Project, ProjectWithTasks, UpdateProject},
    task::{CreateTask, Task, TaskQuery, UpdateTask},
};
use deployment::Deployment;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use sqlx::SqlitePool;
use ts_rs::TS;
use uuid::Uuid;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{ApiJson, ApiQuery, WithId, require_id},
};

const TASK_NOT_FOUND: &str = "Task not found";
const PROJECT_NOT_FOUND: &str = "Project not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Task,
    Project,
}

impl ItemType {
    fn from_body(body: &Value) -> Result<Self, ApiError> {
        body.get("itemType")
            .and_then(|v| Self::deserialize(v).ok())
            .ok_or_else(|| ApiError::bad_request("Invalid item type"))
    }
}

#[derive(Debug, Serialize, TS)]
pub struct TasksOverview {
    pub tasks: Vec<Task>,
    pub projects: Vec<ProjectWithTasks>,
}

#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
pub enum TaskOrProject {
    Task(Task),
    Project(ProjectWithTasks),
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}

fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
}

async fn with_task_ids(pool: &SqlitePool, project: Project) -> Result<ProjectWithTasks, ApiError> {
    let tasks = Task::find_by_project_id(pool, project.id)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    Ok(ProjectWithTasks { project, tasks })
}

/// GET /api/tasks
pub async fn get_tasks(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(query): ApiQuery<TaskQuery>,
) -> Result<ResponseJson<ApiResponse<TasksOverview>>, ApiError> {
    let pool = &deployment.db().pool;
    let tasks = Task::find_filtered(pool, &query).await?;
    let projects = Project::find_all_with_tasks(pool).await?;
    let total = tasks.len();

    Ok(ResponseJson(
        ApiResponse::success(TasksOverview { tasks, projects }).with_total(total),
    ))
}

/// POST /api/tasks
pub async fn create_item(
    State(deployment): State<DeploymentImpl>,
    ApiJson(body): ApiJson<Value>,
) -> Result<ResponseJson<ApiResponse<TaskOrProject>>, ApiError> {
    let pool = &deployment.db().pool;

    match ItemType::from_body(&body)? {
        ItemType::Task => {
            let payload: CreateTask = parse_body(body)?;
            payload.validate().map_err(ApiError::BadRequest)?;
            let task = Task::create(pool, payload, Uuid::new_v4()).await?;
            tracing::info!(task_id = %task.id, project_id = ?task.project_id, "Task created");
            Ok(ResponseJson(
                ApiResponse::success(TaskOrProject::Task(task)).with_message("Task created successfully"),
            ))
        }
        ItemType::Project => {
            let payload: CreateProject = parse_body(body)?;
            payload.validate().map_err(ApiError::BadRequest)?;
            let project = Project::create(pool, payload, Uuid::new_v4()).await?;
            tracing::info!(project_id = %project.id, "Project created");
            Ok(ResponseJson(
                ApiResponse::success(TaskOrProject::Project(ProjectWithTasks {
                    project,
                    tasks: Vec::new(),
                }))
                .with_message("Project created successfully"),
            ))
        }
    }
}

/// PUT /api/tasks
pub async fn update_item(
    State(deployment): State<DeploymentImpl>,
    ApiJson(body): ApiJson<Value>,
) -> Result<ResponseJson<ApiResponse<TaskOrProject>>, ApiError> {
    let pool = &deployment.db().pool;

    match ItemType::from_body(&body)? {
        ItemType::Task => {
            let payload: WithId<UpdateTask> = parse_body(body)?;
            let id = require_id(payload.id.as_deref(), TASK_NOT_FOUND)?;
            payload.changes.validate().map_err(ApiError::BadRequest)?;

            let task = Task::update(pool, id, payload.changes)
                .await?
                .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))?;
            Ok(ResponseJson(
                ApiResponse::success(TaskOrProject::Task(task)).with_message("Task updated successfully"),
            ))
        }
        ItemType::Project => {
            let payload: WithId<UpdateProject> = parse_body(body)?;
            let id = require_id(payload.id.as_deref(), PROJECT_NOT_FOUND)?;
            payload.changes.validate().map_err(ApiError::BadRequest)?;

            let project = Project::update(pool, id, payload.changes)
                .await?
                .ok_or_else(|| ApiError::not_found(PROJECT_NOT_FOUND))?;
            let project = with_task_ids(pool, project).await?;
            Ok(ResponseJson(
                ApiResponse::success(TaskOrProject::Project(project))
                    .with_message("Project updated successfully"),
            ))
        }
    }
}

/// DELETE /api/tasks?id=&type=task|project
pub async fn delete_item(
    State(deployment): State<DeploymentImpl>,
    ApiQuery(params): ApiQuery<DeleteParams>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let (Some(raw_id), Some(raw_type)) = (params.id.as_deref(), params.item_type.as_deref()) else {
        return Err(ApiError::bad_request("ID and type are required"));
    };
    let item_type = ItemType::deserialize(Value::String(raw_type.trim().to_string()))
        .map_err(|_| ApiError::bad_request("Invalid item type"))?;
    let pool = &deployment.db().pool;

    match item_type {
        ItemType::Task => {
            let id = require_id(Some(raw_id), TASK_NOT_FOUND)?;
            if Task::delete(pool, id).await? == 0 {
                return Err(ApiError::not_found(TASK_NOT_FOUND));
            }
            Ok(ResponseJson(ApiResponse::message_only("Task deleted successfully")))
        }
        ItemType::Project => {
            let id = require_id(Some(raw_id), PROJECT_NOT_FOUND)?;
            if Project::delete(pool, id).await? == 0 {
                return Err(ApiError::not_found(PROJECT_NOT_FOUND));
            }
            Ok(ResponseJson(ApiResponse::message_only("Project deleted successfully")))
        }
    }
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route(
        "/tasks",
        get(get_tasks).post(create_item).put(update_item).delete(delete_item),
    )
}
