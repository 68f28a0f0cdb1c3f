use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqliteConnection, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::common::{Priority, require_text};

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Archived,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub progress: i64, // 0-100, share of completed tasks
    pub estimated_completion: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project plus the ids of the tasks that reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct ProjectWithTasks {
    #[serde(flatten)]
    #[ts(flatten)]
    pub project: Project,
    pub tasks: Vec<Uuid>,
}

impl std::ops::Deref for ProjectWithTasks {
    type Target = Project;
    fn deref(&self) -> &Self::Target {
        &self.project
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub estimated_completion: Option<DateTime<Utc>>,
}

impl CreateProject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text("Name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    /// `null` clears the date, an absent member leaves it untouched.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(as = "Option<DateTime<Utc>>")]
    pub estimated_completion: Option<Option<DateTime<Utc>>>,
}

impl UpdateProject {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            require_text("Name", name)?;
        }
        Ok(())
    }
}

/// Share of completed tasks as a whole percentage, rounding halves up.
pub fn progress_percent(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as i64
}

const SELECT_COLUMNS: &str = "SELECT id, name, description, status, priority, progress, \
     estimated_completion, created_at, updated_at FROM projects";

impl Project {
    pub fn new(data: CreateProject, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: data.name.trim().to_string(),
            description: data.description.unwrap_or_default(),
            status: data.status.unwrap_or_default(),
            priority: data.priority.unwrap_or_default(),
            progress: 0,
            estimated_completion: data.estimated_completion,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: UpdateProject, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(estimated_completion) = changes.estimated_completion {
            self.estimated_completion = estimated_completion;
        }
        self.updated_at = now;
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!("{SELECT_COLUMNS} ORDER BY rowid ASC"))
            .fetch_all(pool)
            .await
    }

    pub async fn find_all_with_tasks(
        pool: &SqlitePool,
    ) -> Result<Vec<ProjectWithTasks>, sqlx::Error> {
        let projects = Self::find_all(pool).await?;
        let links: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT project_id, id FROM tasks WHERE project_id IS NOT NULL ORDER BY rowid ASC",
        )
        .fetch_all(pool)
        .await?;

        let mut by_project: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (project_id, task_id) in links {
            by_project.entry(project_id).or_default().push(task_id);
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let tasks = by_project.remove(&project.id).unwrap_or_default();
                ProjectWithTasks { project, tasks }
            })
            .collect())
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Project>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn exists<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(count > 0)
    }

    pub async fn create(
        pool: &SqlitePool,
        data: CreateProject,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let project = Self::new(data, id, Utc::now());
        sqlx::query(
            r#"INSERT INTO projects (id, name, description, status, priority, progress, estimated_completion, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status)
        .bind(project.priority)
        .bind(project.progress)
        .bind(project.estimated_completion)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(pool)
        .await?;
        Ok(project)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        changes: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(mut project) = Self::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        project.apply(changes, Utc::now());

        sqlx::query(
            r#"UPDATE projects
               SET name = $2, description = $3, status = $4, priority = $5,
                   estimated_completion = $6, updated_at = $7
               WHERE id = $1"#,
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status)
        .bind(project.priority)
        .bind(project.estimated_completion)
        .bind(project.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(project))
    }

    /// Recount the project's tasks and store the new progress.
    /// Callers run this on the same connection/transaction as the task write.
    pub async fn recompute_progress(
        conn: &mut SqliteConnection,
        id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            r#"SELECT COUNT(*),
                      COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0)
               FROM tasks
               WHERE project_id = $1"#,
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        let progress = progress_percent(completed, total);
        sqlx::query("UPDATE projects SET progress = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(progress)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

        tracing::debug!(project_id = %id, total, completed, progress, "Recomputed project progress");
        Ok(progress)
    }

    /// Tasks referencing the project keep living with `projectId = null`.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
