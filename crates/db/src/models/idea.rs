use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::common::{Priority, normalize_labels, require_range, require_text};
use crate::filter::{Filter, Searchable};

#[derive(Debug, Error)]
pub enum IdeaError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("connected idea {0} not found")]
    ConnectionNotFound(Uuid),
}

/// Growth stage of an idea in the incubation pipeline.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "idea_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IdeaStatus {
    #[default]
    Seed,
    Sprout,
    Sapling,
    Tree,
    Archived,
}

impl IdeaStatus {
    pub const ALL: [IdeaStatus; 5] = [
        IdeaStatus::Seed,
        IdeaStatus::Sprout,
        IdeaStatus::Sapling,
        IdeaStatus::Tree,
        IdeaStatus::Archived,
    ];
}

/// Impact/effort matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Quadrant {
    QuickWins,
    MajorProjects,
    FillIns,
    ThanklessTasks,
}

impl Quadrant {
    pub const HIGH_IMPACT: i64 = 7;
    pub const LOW_EFFORT: i64 = 4;

    pub fn classify(impact: i64, effort: i64) -> Self {
        match (impact >= Self::HIGH_IMPACT, effort <= Self::LOW_EFFORT) {
            (true, true) => Quadrant::QuickWins,
            (true, false) => Quadrant::MajorProjects,
            (false, true) => Quadrant::FillIns,
            (false, false) => Quadrant::ThanklessTasks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: IdeaStatus,
    pub priority: Priority,
    pub category: String,
    pub impact: i64, // 1-10
    pub effort: i64, // 1-10
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub estimated_value: Option<String>,
    pub next_milestone: Option<String>,
    #[sqlx(json)]
    pub connections: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    pub fn quadrant(&self) -> Quadrant {
        Quadrant::classify(self.impact, self.effort)
    }
}

impl Searchable for Idea {
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

/// Ideas grouped by quadrant; every idea lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
pub struct Quadrants {
    pub quick_wins: Vec<Idea>,
    pub major_projects: Vec<Idea>,
    pub fill_ins: Vec<Idea>,
    pub thankless_tasks: Vec<Idea>,
}

impl Quadrants {
    pub fn from_ideas(ideas: &[Idea]) -> Self {
        let mut out = Self::default();
        for idea in ideas {
            let bucket = match idea.quadrant() {
                Quadrant::QuickWins => &mut out.quick_wins,
                Quadrant::MajorProjects => &mut out.major_projects,
                Quadrant::FillIns => &mut out.fill_ins,
                Quadrant::ThanklessTasks => &mut out.thankless_tasks,
            };
            bucket.push(idea.clone());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.quick_wins.len() + self.major_projects.len() + self.fill_ins.len() + self.thankless_tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct StatusCounts {
    pub seed: usize,
    pub sprout: usize,
    pub sapling: usize,
    pub tree: usize,
    pub archived: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct IdeaStats {
    pub total: usize,
    pub by_status: StatusCounts,
}

impl IdeaStats {
    pub fn from_ideas(ideas: &[Idea]) -> Self {
        let mut by_status = StatusCounts::default();
        for idea in ideas {
            let slot = match idea.status {
                IdeaStatus::Seed => &mut by_status.seed,
                IdeaStatus::Sprout => &mut by_status.sprout,
                IdeaStatus::Sapling => &mut by_status.sapling,
                IdeaStatus::Tree => &mut by_status.tree,
                IdeaStatus::Archived => &mut by_status.archived,
            };
            *slot += 1;
        }
        Self {
            total: ideas.len(),
            by_status,
        }
    }
}

fn validate_scores(impact: Option<i64>, effort: Option<i64>) -> Result<(), String> {
    if let Some(impact) = impact {
        require_range("Impact", impact, 1, 10)?;
    }
    if let Some(effort) = effort {
        require_range("Effort", effort, 1, 10)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdea {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub impact: Option<i64>,
    pub effort: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub estimated_value: Option<String>,
    pub next_milestone: Option<String>,
}

impl CreateIdea {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn scored(title: impl Into<String>, impact: i64, effort: i64) -> Self {
        Self {
            impact: Some(impact),
            effort: Some(effort),
            ..Self::titled(title)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text("Title", &self.title)?;
        validate_scores(self.impact, self.effort)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIdea {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<IdeaStatus>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub impact: Option<i64>,
    pub effort: Option<i64>,
    pub tags: Option<Vec<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(as = "Option<String>")]
    pub estimated_value: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(as = "Option<String>")]
    pub next_milestone: Option<Option<String>>,
    pub connections: Option<Vec<Uuid>>,
}

impl UpdateIdea {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            require_text("Title", title)?;
        }
        validate_scores(self.impact, self.effort)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct IdeaQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

impl IdeaQuery {
    pub fn filter(&self) -> Filter<'static, Idea> {
        Filter::new()
            .eq(self.status.as_deref(), |i: &Idea| i.status.to_string())
            .eq(self.category.as_deref(), |i: &Idea| i.category.clone())
            .eq(self.priority.as_deref(), |i: &Idea| i.priority.to_string())
            .search(self.search.as_deref())
    }
}

const SELECT_COLUMNS: &str = "SELECT id, title, description, status, priority, category, impact, effort, \
     tags, estimated_value, next_milestone, connections, created_at, updated_at FROM ideas";

impl Idea {
    pub fn new(data: CreateIdea, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: data.title.trim().to_string(),
            description: data.description.unwrap_or_default(),
            status: IdeaStatus::Seed,
            priority: data.priority.unwrap_or_default(),
            category: data.category.unwrap_or_else(|| "personal".to_string()),
            impact: data.impact.unwrap_or(5),
            effort: data.effort.unwrap_or(5),
            tags: normalize_labels(data.tags.unwrap_or_default()),
            estimated_value: data.estimated_value,
            next_milestone: data.next_milestone,
            connections: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: UpdateIdea, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title.trim().to_string();
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
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(impact) = changes.impact {
            self.impact = impact;
        }
        if let Some(effort) = changes.effort {
            self.effort = effort;
        }
        if let Some(tags) = changes.tags {
            self.tags = normalize_labels(tags);
        }
        if let Some(estimated_value) = changes.estimated_value {
            self.estimated_value = estimated_value;
        }
        if let Some(next_milestone) = changes.next_milestone {
            self.next_milestone = next_milestone;
        }
        if let Some(connections) = changes.connections {
            self.connections = Vec::with_capacity(connections.len());
            for id in connections {
                if id != self.id && !self.connections.contains(&id) {
                    self.connections.push(id);
                }
            }
        }
        self.updated_at = now;
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Idea>(&format!("{SELECT_COLUMNS} ORDER BY rowid ASC"))
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Idea>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: CreateIdea, id: Uuid) -> Result<Self, sqlx::Error> {
        let idea = Self::new(data, id, Utc::now());
        sqlx::query(
            r#"INSERT INTO ideas (id, title, description, status, priority, category, impact, effort,
                   tags, estimated_value, next_milestone, connections, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
        )
        .bind(idea.id)
        .bind(&idea.title)
        .bind(&idea.description)
        .bind(idea.status)
        .bind(idea.priority)
        .bind(&idea.category)
        .bind(idea.impact)
        .bind(idea.effort)
        .bind(Json(&idea.tags))
        .bind(&idea.estimated_value)
        .bind(&idea.next_milestone)
        .bind(Json(&idea.connections))
        .bind(idea.created_at)
        .bind(idea.updated_at)
        .execute(pool)
        .await?;
        Ok(idea)
    }

    pub async fn exists<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ideas WHERE id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(count > 0)
    }

    /// Connections must name ideas that exist at write time.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        changes: UpdateIdea,
    ) -> Result<Option<Self>, IdeaError> {
        let mut tx = pool.begin().await?;
        let Some(mut idea) = Self::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        idea.apply(changes, Utc::now());
        for &other in &idea.connections {
            if !Self::exists(&mut *tx, other).await? {
                return Err(IdeaError::ConnectionNotFound(other));
            }
        }

        sqlx::query(
            r#"UPDATE ideas
               SET title = $2, description = $3, status = $4, priority = $5, category = $6,
                   impact = $7, effort = $8, tags = $9, estimated_value = $10,
                   next_milestone = $11, connections = $12, updated_at = $13
               WHERE id = $1"#,
        )
        .bind(idea.id)
        .bind(&idea.title)
        .bind(&idea.description)
        .bind(idea.status)
        .bind(idea.priority)
        .bind(&idea.category)
        .bind(idea.impact)
        .bind(idea.effort)
        .bind(Json(&idea.tags))
        .bind(&idea.estimated_value)
        .bind(&idea.next_milestone)
        .bind(Json(&idea.connections))
        .bind(idea.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(idea))
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM ideas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
