use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqliteConnection, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::{
    common::{Priority, normalize_labels, require_text},
    project::Project,
};
use crate::filter::{Filter, Searchable};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("project {0} not found")]
    ProjectNotFound(Uuid),
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskType {
    #[default]
    Task,
    Habit,
    Project,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Active,
    Completed,
}

/// How much focus a task needs.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "energy", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Energy {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Subtask as sent by clients; new entries come without an id.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskInput {
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SubtaskInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            completed: false,
            completed_at: None,
        }
    }
}

/// Turn client subtasks into stored ones, keeping stamps of subtasks that were
/// already completed and stamping newly completed ones with `now`.
fn merge_subtasks(
    existing: &[Subtask],
    incoming: Vec<SubtaskInput>,
    now: DateTime<Utc>,
) -> Vec<Subtask> {
    incoming
        .into_iter()
        .map(|input| {
            let previous = input
                .id
                .and_then(|id| existing.iter().find(|s| s.id == id));
            let completed_at = if input.completed {
                input
                    .completed_at
                    .or_else(|| previous.and_then(|p| p.completed_at))
                    .or(Some(now))
            } else {
                None
            };
            Subtask {
                id: input.id.unwrap_or_else(Uuid::new_v4),
                title: input.title.trim().to_string(),
                completed: input.completed,
                completed_at,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub priority: Priority,
    pub status: TaskStatus,
    pub energy: Energy,
    #[sqlx(json)]
    pub context: Vec<String>, // GTD contexts such as "@home"
    pub estimated_time: i64, // minutes
    pub actual_time: i64,    // minutes
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>, // Foreign key to Project
    #[sqlx(json)]
    pub tags: Vec<String>,
    #[sqlx(json)]
    pub subtasks: Vec<Subtask>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Searchable for Task {
    fn title(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,
    pub priority: Option<Priority>,
    pub energy: Option<Energy>,
    pub context: Option<Vec<String>>,
    pub estimated_time: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
    /// Project name from older clients. Only `projectId` links a task.
    #[serde(default, skip_serializing)]
    #[ts(skip)]
    pub project: Option<String>,
    pub tags: Option<Vec<String>>,
    pub subtasks: Option<Vec<SubtaskInput>>,
}

impl CreateTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn in_project(title: impl Into<String>, project_id: Uuid) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::titled(title)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text("Title", &self.title)?;
        reject_project_name(self.project.as_deref())?;
        non_negative("Estimated time", self.estimated_time)
    }
}

pub const PROJECT_NAME_UNSUPPORTED: &str = "Use projectId to link a task to a project";

fn reject_project_name(project: Option<&str>) -> Result<(), String> {
    match project {
        Some(_) => Err(PROJECT_NAME_UNSUPPORTED.to_string()),
        None => Ok(()),
    }
}

fn non_negative(field: &str, minutes: Option<i64>) -> Result<(), String> {
    match minutes {
        Some(m) if m < 0 => Err(format!("{field} cannot be negative")),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub energy: Option<Energy>,
    pub context: Option<Vec<String>>,
    pub estimated_time: Option<i64>,
    pub actual_time: Option<i64>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(as = "Option<DateTime<Utc>>")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(as = "Option<Uuid>")]
    pub project_id: Option<Option<Uuid>>,
    /// Project name from older clients. Only `projectId` links a task.
    #[serde(default, skip_serializing)]
    #[ts(skip)]
    pub project: Option<String>,
    pub tags: Option<Vec<String>>,
    pub subtasks: Option<Vec<SubtaskInput>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UpdateTask {
    pub fn completed() -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            require_text("Title", title)?;
        }
        reject_project_name(self.project.as_deref())?;
        non_negative("Estimated time", self.estimated_time)?;
        non_negative("Actual time", self.actual_time)
    }
}

/// Query parameters accepted by the task listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct TaskQuery {
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub status: Option<String>,
    pub energy: Option<String>,
    pub context: Option<String>,
    /// Project id or project name.
    pub project: Option<String>,
    pub search: Option<String>,
}

impl TaskQuery {
    /// `project_names` maps project ids to names so `project` can match either.
    pub fn filter(&self, project_names: HashMap<Uuid, String>) -> Filter<'static, Task> {
        Filter::new()
            .eq(self.task_type.as_deref(), |t: &Task| t.task_type.to_string())
            .eq(self.status.as_deref(), |t: &Task| t.status.to_string())
            .eq(self.energy.as_deref(), |t: &Task| t.energy.to_string())
            .contains(self.context.as_deref(), |t: &Task| t.context.as_slice())
            .when(self.project.as_deref(), move |t: &Task, value| {
                t.project_id.is_some_and(|id| {
                    id.to_string() == value
                        || project_names.get(&id).is_some_and(|name| name == value)
                })
            })
            .search(self.search.as_deref())
    }
}

const SELECT_COLUMNS: &str = "SELECT id, title, description, task_type, priority, status, energy, \
     context, estimated_time, actual_time, due_date, project_id, tags, subtasks, completed_at, \
     created_at, updated_at FROM tasks";

impl Task {
    pub fn new(data: CreateTask, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: data.title.trim().to_string(),
            description: data.description.unwrap_or_default(),
            task_type: data.task_type.unwrap_or_default(),
            priority: data.priority.unwrap_or_default(),
            status: TaskStatus::Active,
            energy: data.energy.unwrap_or_default(),
            context: normalize_labels(data.context.unwrap_or_default()),
            estimated_time: data.estimated_time.unwrap_or(30),
            actual_time: 0,
            due_date: data.due_date,
            project_id: data.project_id,
            tags: normalize_labels(data.tags.unwrap_or_default()),
            subtasks: merge_subtasks(&[], data.subtasks.unwrap_or_default(), now),
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge supplied fields over the task. Entering `completed` stamps
    /// `completed_at` unless one is supplied or already set; leaving it clears it.
    pub fn apply(&mut self, changes: UpdateTask, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(task_type) = changes.task_type {
            self.task_type = task_type;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(energy) = changes.energy {
            self.energy = energy;
        }
        if let Some(context) = changes.context {
            self.context = normalize_labels(context);
        }
        if let Some(estimated_time) = changes.estimated_time {
            self.estimated_time = estimated_time;
        }
        if let Some(actual_time) = changes.actual_time {
            self.actual_time = actual_time;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        if let Some(project_id) = changes.project_id {
            self.project_id = project_id;
        }
        if let Some(tags) = changes.tags {
            self.tags = normalize_labels(tags);
        }
        if let Some(subtasks) = changes.subtasks {
            self.subtasks = merge_subtasks(&self.subtasks, subtasks, now);
        }
        match changes.status {
            Some(TaskStatus::Completed) => {
                self.status = TaskStatus::Completed;
                if let Some(completed_at) = changes.completed_at {
                    self.completed_at = Some(completed_at);
                } else if self.completed_at.is_none() {
                    self.completed_at = Some(now);
                }
            }
            Some(TaskStatus::Active) => {
                self.status = TaskStatus::Active;
                self.completed_at = None;
            }
            None => {
                if let Some(completed_at) = changes.completed_at {
                    self.completed_at = Some(completed_at);
                }
            }
        }
        self.updated_at = now;
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("{SELECT_COLUMNS} ORDER BY rowid ASC"))
            .fetch_all(pool)
            .await
    }

    pub async fn find_filtered(
        pool: &SqlitePool,
        query: &TaskQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let project_names = Project::find_all(pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let tasks = Self::find_all(pool).await?;
        Ok(query.filter(project_names).apply(tasks))
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Task>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_project_id(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "{SELECT_COLUMNS} WHERE project_id = $1 ORDER BY rowid ASC"
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    async fn ensure_project(conn: &mut SqliteConnection, project_id: Option<Uuid>) -> Result<(), TaskError> {
        match project_id {
            Some(id) if !Project::exists(&mut *conn, id).await? => Err(TaskError::ProjectNotFound(id)),
            _ => Ok(()),
        }
    }

    async fn write(conn: &mut SqliteConnection, task: &Task, insert: bool) -> Result<(), sqlx::Error> {
        let sql = if insert {
            r#"INSERT INTO tasks (id, title, description, task_type, priority, status, energy, context,
                   estimated_time, actual_time, due_date, project_id, tags, subtasks, completed_at,
                   created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"#
        } else {
            r#"UPDATE tasks
               SET title = $2, description = $3, task_type = $4, priority = $5, status = $6,
                   energy = $7, context = $8, estimated_time = $9, actual_time = $10,
                   due_date = $11, project_id = $12, tags = $13, subtasks = $14,
                   completed_at = $15, created_at = $16, updated_at = $17
               WHERE id = $1"#
        };
        sqlx::query(sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.task_type)
            .bind(task.priority)
            .bind(task.status)
            .bind(task.energy)
            .bind(Json(&task.context))
            .bind(task.estimated_time)
            .bind(task.actual_time)
            .bind(task.due_date)
            .bind(task.project_id)
            .bind(Json(&task.tags))
            .bind(Json(&task.subtasks))
            .bind(task.completed_at)
            .bind(task.created_at)
            .bind(task.updated_at)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Insert the task and refresh its project's progress atomically.
    pub async fn create(pool: &SqlitePool, data: CreateTask, id: Uuid) -> Result<Self, TaskError> {
        let task = Self::new(data, id, Utc::now());

        let mut tx = pool.begin().await?;
        Self::ensure_project(&mut tx, task.project_id).await?;
        Self::write(&mut tx, &task, true).await?;
        if let Some(project_id) = task.project_id {
            Project::recompute_progress(&mut tx, project_id).await?;
        }
        tx.commit().await?;

        Ok(task)
    }

    /// Merge-update the task. Progress is recomputed for the project the task
    /// left and the one it now belongs to.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        changes: UpdateTask,
    ) -> Result<Option<Self>, TaskError> {
        let mut tx = pool.begin().await?;
        let Some(mut task) = Self::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        let previous_project = task.project_id;
        task.apply(changes, Utc::now());

        Self::ensure_project(&mut tx, task.project_id).await?;
        Self::write(&mut tx, &task, false).await?;

        if let Some(project_id) = previous_project.filter(|p| Some(*p) != task.project_id) {
            Project::recompute_progress(&mut tx, project_id).await?;
        }
        if let Some(project_id) = task.project_id {
            Project::recompute_progress(&mut tx, project_id).await?;
        }
        tx.commit().await?;

        Ok(Some(task))
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let project_id: Option<Option<Uuid>> =
            sqlx::query_scalar("SELECT project_id FROM tasks WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(Some(project_id)) = project_id {
            Project::recompute_progress(&mut tx, project_id).await?;
        }
        tx.commit().await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DBService, models::project::CreateProject};

    async fn project(db: &DBService, name: &str) -> Project {
        Project::create(&db.pool, CreateProject::named(name), Uuid::new_v4())
            .await
            .unwrap()
    }

    #[test]
    fn project_name_is_rejected_in_favour_of_project_id() {
        let create: CreateTask = serde_json::from_str(r#"{"title":"Draft","project":"Work"}"#).unwrap();
        assert_eq!(create.validate().unwrap_err(), PROJECT_NAME_UNSUPPORTED);

        let update: UpdateTask = serde_json::from_str(r#"{"project":"Work"}"#).unwrap();
        assert_eq!(update.validate().unwrap_err(), PROJECT_NAME_UNSUPPORTED);

        assert!(CreateTask::in_project("Draft", Uuid::new_v4()).validate().is_ok());
        let body = serde_json::to_value(CreateTask::titled("Draft")).unwrap();
        assert!(body.get("project").is_none());
    }

    #[tokio::test]
    async fn completing_a_task_recomputes_project_progress() {
        let db = DBService::new_in_memory().await.unwrap();
        let x = project(&db, "X").await;

        let mut ids = Vec::new();
        for i in 0..4 {
            let task = Task::create(&db.pool, CreateTask::in_project(format!("t{i}"), x.id), Uuid::new_v4())
                .await
                .unwrap();
            ids.push(task.id);
        }
        for id in &ids[..2] {
            Task::update(&db.pool, *id, UpdateTask::completed()).await.unwrap();
        }
        assert_eq!(Project::find_by_id(&db.pool, x.id).await.unwrap().unwrap().progress, 50);

        Task::update(&db.pool, ids[2], UpdateTask::completed()).await.unwrap();
        assert_eq!(Project::find_by_id(&db.pool, x.id).await.unwrap().unwrap().progress, 75);

        Task::delete(&db.pool, ids[3]).await.unwrap();
        assert_eq!(Project::find_by_id(&db.pool, x.id).await.unwrap().unwrap().progress, 100);
    }

    #[tokio::test]
    async fn moving_a_task_updates_both_projects() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = project(&db, "A").await;
        let b = project(&db, "B").await;

        let done = Task::create(&db.pool, CreateTask::in_project("done", a.id), Uuid::new_v4())
            .await
            .unwrap();
        Task::update(&db.pool, done.id, UpdateTask::completed()).await.unwrap();
        Task::create(&db.pool, CreateTask::in_project("open", a.id), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(Project::find_by_id(&db.pool, a.id).await.unwrap().unwrap().progress, 50);

        let moved = UpdateTask {
            project_id: Some(Some(b.id)),
            ..Default::default()
        };
        Task::update(&db.pool, done.id, moved).await.unwrap();

        assert_eq!(Project::find_by_id(&db.pool, a.id).await.unwrap().unwrap().progress, 0);
        assert_eq!(Project::find_by_id(&db.pool, b.id).await.unwrap().unwrap().progress, 100);

        let listed = Project::find_all_with_tasks(&db.pool).await.unwrap();
        let b_listed = listed.iter().find(|p| p.id == b.id).unwrap();
        assert_eq!(b_listed.tasks, vec![done.id]);
    }

    #[tokio::test]
    async fn unknown_project_is_rejected() {
        let db = DBService::new_in_memory().await.unwrap();
        let missing = Uuid::new_v4();
        let err = Task::create(&db.pool, CreateTask::in_project("orphan", missing), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::ProjectNotFound(id) if id == missing));
        assert!(Task::find_all(&db.pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleted_task_is_gone() {
        let db = DBService::new_in_memory().await.unwrap();
        let task = Task::create(&db.pool, CreateTask::titled("Call mom"), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(Task::delete(&db.pool, task.id).await.unwrap(), 1);
        assert!(Task::find_by_id(&db.pool, task.id).await.unwrap().is_none());
        assert_eq!(Task::delete(&db.pool, task.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_project_detaches_tasks() {
        let db = DBService::new_in_memory().await.unwrap();
        let p = project(&db, "Personal").await;
        let task = Task::create(&db.pool, CreateTask::in_project("Call mom", p.id), Uuid::new_v4())
            .await
            .unwrap();

        Project::delete(&db.pool, p.id).await.unwrap();
        let task = Task::find_by_id(&db.pool, task.id).await.unwrap().unwrap();
        assert_eq!(task.project_id, None);
    }

    #[test]
    fn defaults_on_create() {
        let task = Task::new(CreateTask::titled("Workout"), Uuid::new_v4(), Utc::now());
        assert_eq!(task.task_type, TaskType::Task);
        assert_eq!(task.status, TaskStatus::Active);
        assert_eq!(task.energy, Energy::Medium);
        assert_eq!(task.estimated_time, 30);
        assert_eq!(task.actual_time, 0);
        assert!(task.subtasks.is_empty());
    }

    #[test]
    fn reopening_clears_completed_at_and_identical_updates_are_idempotent() {
        let now = Utc::now();
        let mut task = Task::new(CreateTask::titled("Proposal"), Uuid::new_v4(), now);

        task.apply(UpdateTask::completed(), now);
        let first = task.clone();
        task.apply(UpdateTask::completed(), now + chrono::Duration::seconds(5));
        assert_eq!(task.completed_at, first.completed_at);

        task.apply(
            UpdateTask {
                status: Some(TaskStatus::Active),
                ..Default::default()
            },
            now,
        );
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn subtasks_keep_ids_and_stamp_completion() {
        let now = Utc::now();
        let mut task = Task::new(
            CreateTask {
                subtasks: Some(vec![SubtaskInput::titled("Research"), SubtaskInput::titled("Draft")]),
                ..CreateTask::titled("Proposal")
            },
            Uuid::new_v4(),
            now,
        );
        let research = task.subtasks[0].clone();
        assert!(research.completed_at.is_none());

        let later = now + chrono::Duration::minutes(1);
        task.apply(
            UpdateTask {
                subtasks: Some(vec![
                    SubtaskInput {
                        id: Some(research.id),
                        title: research.title.clone(),
                        completed: true,
                        completed_at: None,
                    },
                    SubtaskInput::titled("Write"),
                ]),
                ..Default::default()
            },
            later,
        );

        assert_eq!(task.subtasks.len(), 2);
        assert_eq!(task.subtasks[0].id, research.id);
        assert_eq!(task.subtasks[0].completed_at, Some(later));
        assert!(!task.subtasks[1].completed);
    }

    #[test]
    fn project_filter_matches_id_or_name() {
        let now = Utc::now();
        let project_id = Uuid::new_v4();
        let inside = Task::new(CreateTask::in_project("in", project_id), Uuid::new_v4(), now);
        let outside = Task::new(CreateTask::titled("out"), Uuid::new_v4(), now);
        let names = HashMap::from([(project_id, "Client Work".to_string())]);

        let by_name = TaskQuery {
            project: Some("Client Work".into()),
            ..Default::default()
        };
        assert_eq!(
            by_name.filter(names.clone()).apply(vec![inside.clone(), outside.clone()]),
            vec![inside.clone()]
        );

        let by_id = TaskQuery {
            project: Some(project_id.to_string()),
            ..Default::default()
        };
        assert_eq!(by_id.filter(names).apply(vec![inside.clone(), outside]), vec![inside]);
    }
}
