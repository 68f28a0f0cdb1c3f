//! Life areas with their goals, habits and periodic reviews.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqliteConnection, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::common::{Priority, normalize_labels, require_range, require_text};
use crate::filter::{Filter, Searchable};

#[derive(Debug, Error)]
pub enum LifeAreaError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("life area {0} not found")]
    AreaNotFound(Uuid),
    #[error("{0} {1} not found")]
    ItemNotFound(AreaItem, Uuid),
}

/// Records that hang off a life area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AreaItem {
    Goal,
    Habit,
    Review,
}

impl AreaItem {
    fn table(self) -> &'static str {
        match self {
            AreaItem::Goal => "area_goals",
            AreaItem::Habit => "area_habits",
            AreaItem::Review => "area_reviews",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "goal_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "habit_frequency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HabitFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "review_period", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReviewPeriod {
    #[default]
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct LifeArea {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
    pub current_score: i64, // 0-100
    pub target_score: i64,  // 0-100
    pub created_at: DateTime<Utc>,
    #[serde(rename = "lastUpdated")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub target_date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Milestone as sent by clients; new entries come without an id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneInput {
    pub id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

fn merge_milestones(
    existing: &[Milestone],
    incoming: Vec<MilestoneInput>,
    now: DateTime<Utc>,
) -> Vec<Milestone> {
    incoming
        .into_iter()
        .map(|input| {
            let previous = input
                .id
                .and_then(|id| existing.iter().find(|m| m.id == id));
            let completed_at = if input.completed {
                input
                    .completed_at
                    .or_else(|| previous.and_then(|p| p.completed_at))
                    .or(Some(now))
            } else {
                None
            };
            Milestone {
                id: input.id.unwrap_or_else(Uuid::new_v4),
                title: input.title.trim().to_string(),
                description: input.description.unwrap_or_default(),
                target_date: input.target_date,
                completed: input.completed,
                completed_at,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub area_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: GoalStatus,
    pub priority: Priority,
    pub target_date: Option<DateTime<Utc>>,
    pub progress: i64, // 0-100
    #[sqlx(json)]
    pub milestones: Vec<Milestone>,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: Uuid,
    pub area_id: Uuid,
    pub name: String,
    pub description: String,
    pub frequency: HabitFrequency,
    pub target_count: i64,
    pub current_streak: i64,
    pub best_streak: i64,
    pub completion_rate: i64, // 0-100
    pub last_completed: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AreaReview {
    pub id: Uuid,
    pub area_id: Uuid,
    #[serde(rename = "type")]
    pub review_type: ReviewPeriod,
    pub date: DateTime<Utc>,
    pub score: i64, // 0-100
    #[sqlx(json)]
    pub insights: Vec<String>,
    #[sqlx(json)]
    pub achievements: Vec<String>,
    #[sqlx(json)]
    pub challenges: Vec<String>,
    #[sqlx(json)]
    pub next_actions: Vec<String>,
    pub notes: String,
}

/// An area with everything recorded under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct LifeAreaWithItems {
    #[serde(flatten)]
    #[ts(flatten)]
    pub area: LifeArea,
    pub goals: Vec<Goal>,
    pub habits: Vec<Habit>,
    pub reviews: Vec<AreaReview>,
}

impl Searchable for LifeAreaWithItems {
    fn title(&self) -> &str {
        &self.area.name
    }

    fn body(&self) -> &str {
        &self.area.description
    }

    fn tags(&self) -> &[String] {
        &[]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct AreaCategoryCounts {
    pub health: usize,
    pub career: usize,
    pub learning: usize,
    pub personal: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct LifeAreaStats {
    pub total: usize,
    /// Mean current score, rounded; 0 without areas.
    pub overall_score: i64,
    pub total_goals: usize,
    pub active_goals: usize,
    pub total_habits: usize,
    pub active_habits: usize,
    pub total_reviews: usize,
    /// Areas whose name mentions the category.
    pub by_category: AreaCategoryCounts,
}

impl LifeAreaStats {
    pub fn compute(areas: &[LifeAreaWithItems]) -> Self {
        let named = |word: &str| areas.iter().filter(|a| a.area.name.contains(word)).count();
        let score_sum: i64 = areas.iter().map(|a| a.area.current_score).sum();
        let overall_score = if areas.is_empty() {
            0
        } else {
            (score_sum as f64 / areas.len() as f64).round() as i64
        };

        Self {
            total: areas.len(),
            overall_score,
            total_goals: areas.iter().map(|a| a.goals.len()).sum(),
            active_goals: areas
                .iter()
                .flat_map(|a| &a.goals)
                .filter(|g| g.status == GoalStatus::Active)
                .count(),
            total_habits: areas.iter().map(|a| a.habits.len()).sum(),
            active_habits: areas
                .iter()
                .flat_map(|a| &a.habits)
                .filter(|h| h.is_active)
                .count(),
            total_reviews: areas.iter().map(|a| a.reviews.len()).sum(),
            by_category: AreaCategoryCounts {
                health: named("Health"),
                career: named("Career"),
                learning: named("Learning"),
                personal: named("Personal"),
            },
        }
    }
}

fn optional_score(field: &str, value: Option<i64>) -> Result<(), String> {
    match value {
        Some(v) => require_range(field, v, 0, 100),
        None => Ok(()),
    }
}

fn non_negative(field: &str, value: Option<i64>) -> Result<(), String> {
    match value {
        Some(v) if v < 0 => Err(format!("{field} cannot be negative")),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateLifeArea {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub target_score: Option<i64>,
}

impl CreateLifeArea {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text("Name", &self.name)?;
        optional_score("Target score", self.target_score)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLifeArea {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub current_score: Option<i64>,
    pub target_score: Option<i64>,
}

impl UpdateLifeArea {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            require_text("Name", name)?;
        }
        optional_score("Current score", self.current_score)?;
        optional_score("Target score", self.target_score)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoal {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub target_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
}

impl CreateGoal {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text("Title", &self.title)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoal {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    pub priority: Option<Priority>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(as = "Option<DateTime<Utc>>")]
    pub target_date: Option<Option<DateTime<Utc>>>,
    pub progress: Option<i64>,
    pub milestones: Option<Vec<MilestoneInput>>,
    pub tags: Option<Vec<String>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UpdateGoal {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            require_text("Title", title)?;
        }
        if let Some(milestones) = &self.milestones {
            for milestone in milestones {
                require_text("Milestone title", &milestone.title)?;
            }
        }
        optional_score("Progress", self.progress)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabit {
    pub name: String,
    pub description: Option<String>,
    pub frequency: Option<HabitFrequency>,
    pub target_count: Option<i64>,
}

impl CreateHabit {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text("Name", &self.name)?;
        validate_target_count(self.target_count)
    }
}

fn validate_target_count(target_count: Option<i64>) -> Result<(), String> {
    match target_count {
        Some(count) if count < 1 => Err("Target count must be at least 1".to_string()),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<HabitFrequency>,
    pub target_count: Option<i64>,
    pub current_streak: Option<i64>,
    pub best_streak: Option<i64>,
    pub completion_rate: Option<i64>,
    pub last_completed: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl UpdateHabit {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            require_text("Name", name)?;
        }
        validate_target_count(self.target_count)?;
        non_negative("Current streak", self.current_streak)?;
        non_negative("Best streak", self.best_streak)?;
        optional_score("Completion rate", self.completion_rate)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateAreaReview {
    #[serde(rename = "type")]
    pub review_type: Option<ReviewPeriod>,
    pub date: Option<DateTime<Utc>>,
    pub score: Option<i64>,
    pub insights: Option<Vec<String>>,
    pub achievements: Option<Vec<String>>,
    pub challenges: Option<Vec<String>>,
    pub next_actions: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl CreateAreaReview {
    pub fn validate(&self) -> Result<(), String> {
        optional_score("Score", self.score)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct LifeAreaQuery {
    pub search: Option<String>,
}

impl LifeAreaQuery {
    pub fn filter(&self) -> Filter<'static, LifeAreaWithItems> {
        Filter::new().search(self.search.as_deref())
    }
}

const SELECT_AREAS: &str = "SELECT id, name, description, color, icon, current_score, target_score, \
     created_at, updated_at FROM life_areas";
const SELECT_GOALS: &str = "SELECT id, area_id, title, description, status, priority, target_date, \
     progress, milestones, tags, completed_at, created_at FROM area_goals";
const SELECT_HABITS: &str = "SELECT id, area_id, name, description, frequency, target_count, \
     current_streak, best_streak, completion_rate, last_completed, is_active, created_at FROM area_habits";
const SELECT_REVIEWS: &str = "SELECT id, area_id, review_type, date, score, insights, achievements, \
     challenges, next_actions, notes FROM area_reviews";

fn group_by_area<T>(items: Vec<T>, area_id: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for item in items {
        grouped.entry(area_id(&item)).or_default().push(item);
    }
    grouped
}

impl LifeArea {
    pub fn new(data: CreateLifeArea, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: data.name.trim().to_string(),
            description: data.description.unwrap_or_default(),
            color: data.color.unwrap_or_else(|| "bg-gray-500".to_string()),
            icon: data.icon.unwrap_or_else(|| "Circle".to_string()),
            current_score: 50,
            target_score: data.target_score.unwrap_or(80),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: UpdateLifeArea, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(color) = changes.color {
            self.color = color;
        }
        if let Some(icon) = changes.icon {
            self.icon = icon;
        }
        if let Some(current_score) = changes.current_score {
            self.current_score = current_score;
        }
        if let Some(target_score) = changes.target_score {
            self.target_score = target_score;
        }
        self.updated_at = now;
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, LifeArea>(&format!("{SELECT_AREAS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn exists<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM life_areas WHERE id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(count > 0)
    }

    pub async fn find_all_with_items(pool: &SqlitePool) -> Result<Vec<LifeAreaWithItems>, sqlx::Error> {
        let areas = sqlx::query_as::<_, LifeArea>(&format!("{SELECT_AREAS} ORDER BY rowid ASC"))
            .fetch_all(pool)
            .await?;
        let goals = sqlx::query_as::<_, Goal>(&format!("{SELECT_GOALS} ORDER BY rowid ASC"))
            .fetch_all(pool)
            .await?;
        let habits = sqlx::query_as::<_, Habit>(&format!("{SELECT_HABITS} ORDER BY rowid ASC"))
            .fetch_all(pool)
            .await?;
        let reviews = sqlx::query_as::<_, AreaReview>(&format!("{SELECT_REVIEWS} ORDER BY rowid ASC"))
            .fetch_all(pool)
            .await?;

        let mut goals = group_by_area(goals, |g| g.area_id);
        let mut habits = group_by_area(habits, |h| h.area_id);
        let mut reviews = group_by_area(reviews, |r| r.area_id);

        Ok(areas
            .into_iter()
            .map(|area| LifeAreaWithItems {
                goals: goals.remove(&area.id).unwrap_or_default(),
                habits: habits.remove(&area.id).unwrap_or_default(),
                reviews: reviews.remove(&area.id).unwrap_or_default(),
                area,
            })
            .collect())
    }

    pub async fn find_with_items(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<LifeAreaWithItems>, sqlx::Error> {
        let Some(area) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let goals = sqlx::query_as::<_, Goal>(&format!("{SELECT_GOALS} WHERE area_id = $1 ORDER BY rowid ASC"))
            .bind(id)
            .fetch_all(pool)
            .await?;
        let habits = sqlx::query_as::<_, Habit>(&format!("{SELECT_HABITS} WHERE area_id = $1 ORDER BY rowid ASC"))
            .bind(id)
            .fetch_all(pool)
            .await?;
        let reviews =
            sqlx::query_as::<_, AreaReview>(&format!("{SELECT_REVIEWS} WHERE area_id = $1 ORDER BY rowid ASC"))
                .bind(id)
                .fetch_all(pool)
                .await?;

        Ok(Some(LifeAreaWithItems {
            area,
            goals,
            habits,
            reviews,
        }))
    }

    pub async fn create(
        pool: &SqlitePool,
        data: CreateLifeArea,
        id: Uuid,
    ) -> Result<LifeAreaWithItems, sqlx::Error> {
        let area = Self::new(data, id, Utc::now());
        sqlx::query(
            r#"INSERT INTO life_areas (id, name, description, color, icon, current_score, target_score,
                   created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(area.id)
        .bind(&area.name)
        .bind(&area.description)
        .bind(&area.color)
        .bind(&area.icon)
        .bind(area.current_score)
        .bind(area.target_score)
        .bind(area.created_at)
        .bind(area.updated_at)
        .execute(pool)
        .await?;

        Ok(LifeAreaWithItems {
            area,
            goals: Vec::new(),
            habits: Vec::new(),
            reviews: Vec::new(),
        })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        changes: UpdateLifeArea,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(mut area) = Self::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        area.apply(changes, Utc::now());

        sqlx::query(
            r#"UPDATE life_areas
               SET name = $2, description = $3, color = $4, icon = $5, current_score = $6,
                   target_score = $7, updated_at = $8
               WHERE id = $1"#,
        )
        .bind(area.id)
        .bind(&area.name)
        .bind(&area.description)
        .bind(&area.color)
        .bind(&area.icon)
        .bind(area.current_score)
        .bind(area.target_score)
        .bind(area.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(area))
    }

    /// Removes the area together with its goals, habits and reviews.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM life_areas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Fail unless the area exists, then bump its `lastUpdated`.
    async fn touch(conn: &mut SqliteConnection, id: Uuid, now: DateTime<Utc>) -> Result<(), LifeAreaError> {
        let result = sqlx::query("UPDATE life_areas SET updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(LifeAreaError::AreaNotFound(id));
        }
        Ok(())
    }

    /// Delete a goal, habit or review that belongs to `area_id`.
    pub async fn delete_item(
        pool: &SqlitePool,
        area_id: Uuid,
        item: AreaItem,
        item_id: Uuid,
    ) -> Result<(), LifeAreaError> {
        let mut tx = pool.begin().await?;
        Self::touch(&mut tx, area_id, Utc::now()).await?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1 AND area_id = $2", item.table()))
            .bind(item_id)
            .bind(area_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(LifeAreaError::ItemNotFound(item, item_id));
        }
        tx.commit().await?;
        Ok(())
    }
}

impl Goal {
    pub fn new(data: CreateGoal, area_id: Uuid, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            area_id,
            title: data.title.trim().to_string(),
            description: data.description.unwrap_or_default(),
            status: GoalStatus::Active,
            priority: data.priority.unwrap_or_default(),
            target_date: data.target_date,
            progress: 0,
            milestones: Vec::new(),
            tags: normalize_labels(data.tags.unwrap_or_default()),
            completed_at: None,
            created_at: now,
        }
    }

    /// `completedAt` is stamped on entering `completed` and cleared on leaving it.
    pub fn apply(&mut self, changes: UpdateGoal, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(target_date) = changes.target_date {
            self.target_date = target_date;
        }
        if let Some(progress) = changes.progress {
            self.progress = progress;
        }
        if let Some(milestones) = changes.milestones {
            self.milestones = merge_milestones(&self.milestones, milestones, now);
        }
        if let Some(tags) = changes.tags {
            self.tags = normalize_labels(tags);
        }
        if let Some(status) = changes.status {
            self.completed_at = match status {
                GoalStatus::Completed => changes.completed_at.or(self.completed_at).or(Some(now)),
                _ => None,
            };
            self.status = status;
        }
    }

    async fn find_in_area(
        conn: &mut SqliteConnection,
        area_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Goal>(&format!("{SELECT_GOALS} WHERE id = $1 AND area_id = $2"))
            .bind(id)
            .bind(area_id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        area_id: Uuid,
        data: CreateGoal,
        id: Uuid,
    ) -> Result<Self, LifeAreaError> {
        let now = Utc::now();
        let goal = Self::new(data, area_id, id, now);

        let mut tx = pool.begin().await?;
        LifeArea::touch(&mut tx, area_id, now).await?;
        sqlx::query(
            r#"INSERT INTO area_goals (id, area_id, title, description, status, priority, target_date,
                   progress, milestones, tags, completed_at, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
        )
        .bind(goal.id)
        .bind(goal.area_id)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.status)
        .bind(goal.priority)
        .bind(goal.target_date)
        .bind(goal.progress)
        .bind(Json(&goal.milestones))
        .bind(Json(&goal.tags))
        .bind(goal.completed_at)
        .bind(goal.created_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(goal)
    }

    pub async fn update(
        pool: &SqlitePool,
        area_id: Uuid,
        id: Uuid,
        changes: UpdateGoal,
    ) -> Result<Self, LifeAreaError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        LifeArea::touch(&mut tx, area_id, now).await?;
        let mut goal = Self::find_in_area(&mut tx, area_id, id)
            .await?
            .ok_or(LifeAreaError::ItemNotFound(AreaItem::Goal, id))?;
        goal.apply(changes, now);

        sqlx::query(
            r#"UPDATE area_goals
               SET title = $2, description = $3, status = $4, priority = $5, target_date = $6,
                   progress = $7, milestones = $8, tags = $9, completed_at = $10
               WHERE id = $1"#,
        )
        .bind(goal.id)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.status)
        .bind(goal.priority)
        .bind(goal.target_date)
        .bind(goal.progress)
        .bind(Json(&goal.milestones))
        .bind(Json(&goal.tags))
        .bind(goal.completed_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(goal)
    }
}

impl Habit {
    pub fn new(data: CreateHabit, area_id: Uuid, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            area_id,
            name: data.name.trim().to_string(),
            description: data.description.unwrap_or_default(),
            frequency: data.frequency.unwrap_or_default(),
            target_count: data.target_count.unwrap_or(7),
            current_streak: 0,
            best_streak: 0,
            completion_rate: 0,
            last_completed: None,
            is_active: true,
            created_at: now,
        }
    }

    /// The best streak never falls below the current one.
    pub fn apply(&mut self, changes: UpdateHabit) {
        if let Some(name) = changes.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(frequency) = changes.frequency {
            self.frequency = frequency;
        }
        if let Some(target_count) = changes.target_count {
            self.target_count = target_count;
        }
        if let Some(current_streak) = changes.current_streak {
            self.current_streak = current_streak;
        }
        if let Some(best_streak) = changes.best_streak {
            self.best_streak = best_streak;
        }
        if let Some(completion_rate) = changes.completion_rate {
            self.completion_rate = completion_rate;
        }
        if let Some(last_completed) = changes.last_completed {
            self.last_completed = Some(last_completed);
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        self.best_streak = self.best_streak.max(self.current_streak);
    }

    pub async fn create(
        pool: &SqlitePool,
        area_id: Uuid,
        data: CreateHabit,
        id: Uuid,
    ) -> Result<Self, LifeAreaError> {
        let now = Utc::now();
        let habit = Self::new(data, area_id, id, now);

        let mut tx = pool.begin().await?;
        LifeArea::touch(&mut tx, area_id, now).await?;
        sqlx::query(
            r#"INSERT INTO area_habits (id, area_id, name, description, frequency, target_count,
                   current_streak, best_streak, completion_rate, last_completed, is_active, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
        )
        .bind(habit.id)
        .bind(habit.area_id)
        .bind(&habit.name)
        .bind(&habit.description)
        .bind(habit.frequency)
        .bind(habit.target_count)
        .bind(habit.current_streak)
        .bind(habit.best_streak)
        .bind(habit.completion_rate)
        .bind(habit.last_completed)
        .bind(habit.is_active)
        .bind(habit.created_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(habit)
    }

    pub async fn update(
        pool: &SqlitePool,
        area_id: Uuid,
        id: Uuid,
        changes: UpdateHabit,
    ) -> Result<Self, LifeAreaError> {
        let mut tx = pool.begin().await?;
        LifeArea::touch(&mut tx, area_id, Utc::now()).await?;
        let mut habit = sqlx::query_as::<_, Habit>(&format!("{SELECT_HABITS} WHERE id = $1 AND area_id = $2"))
            .bind(id)
            .bind(area_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(LifeAreaError::ItemNotFound(AreaItem::Habit, id))?;
        habit.apply(changes);

        sqlx::query(
            r#"UPDATE area_habits
               SET name = $2, description = $3, frequency = $4, target_count = $5,
                   current_streak = $6, best_streak = $7, completion_rate = $8,
                   last_completed = $9, is_active = $10
               WHERE id = $1"#,
        )
        .bind(habit.id)
        .bind(&habit.name)
        .bind(&habit.description)
        .bind(habit.frequency)
        .bind(habit.target_count)
        .bind(habit.current_streak)
        .bind(habit.best_streak)
        .bind(habit.completion_rate)
        .bind(habit.last_completed)
        .bind(habit.is_active)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(habit)
    }
}

impl AreaReview {
    pub fn new(data: CreateAreaReview, area_id: Uuid, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            area_id,
            review_type: data.review_type.unwrap_or_default(),
            date: data.date.unwrap_or(now),
            score: data.score.unwrap_or(50),
            insights: data.insights.unwrap_or_default(),
            achievements: data.achievements.unwrap_or_default(),
            challenges: data.challenges.unwrap_or_default(),
            next_actions: data.next_actions.unwrap_or_default(),
            notes: data.notes.unwrap_or_default(),
        }
    }

    /// Record a review. An explicit score also becomes the area's current score.
    pub async fn create(
        pool: &SqlitePool,
        area_id: Uuid,
        data: CreateAreaReview,
        id: Uuid,
    ) -> Result<Self, LifeAreaError> {
        let now = Utc::now();
        let rescore = data.score;
        let review = Self::new(data, area_id, id, now);

        let mut tx = pool.begin().await?;
        LifeArea::touch(&mut tx, area_id, now).await?;
        sqlx::query(
            r#"INSERT INTO area_reviews (id, area_id, review_type, date, score, insights, achievements,
                   challenges, next_actions, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(review.id)
        .bind(review.area_id)
        .bind(review.review_type)
        .bind(review.date)
        .bind(review.score)
        .bind(Json(&review.insights))
        .bind(Json(&review.achievements))
        .bind(Json(&review.challenges))
        .bind(Json(&review.next_actions))
        .bind(&review.notes)
        .execute(&mut *tx)
        .await?;

        if let Some(score) = rescore {
            sqlx::query("UPDATE life_areas SET current_score = $2 WHERE id = $1")
                .bind(area_id)
                .bind(score)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    async fn area(db: &DBService, name: &str) -> LifeArea {
        LifeArea::create(&db.pool, CreateLifeArea::named(name), Uuid::new_v4())
            .await
            .unwrap()
            .area
    }

    #[test]
    fn goal_completion_is_stamped_and_cleared() {
        let now = Utc::now();
        let mut goal = Goal::new(CreateGoal::titled("Run a 5K"), Uuid::new_v4(), Uuid::new_v4(), now);
        goal.apply(
            UpdateGoal {
                status: Some(GoalStatus::Completed),
                ..Default::default()
            },
            now,
        );
        assert_eq!(goal.completed_at, Some(now));

        goal.apply(
            UpdateGoal {
                status: Some(GoalStatus::Active),
                ..Default::default()
            },
            now,
        );
        assert_eq!(goal.completed_at, None);
    }

    #[test]
    fn milestones_keep_their_completion_stamp() {
        let earlier = Utc::now() - chrono::Duration::days(3);
        let now = Utc::now();
        let mut goal = Goal::new(CreateGoal::titled("Learn React Native"), Uuid::new_v4(), Uuid::new_v4(), earlier);
        goal.apply(
            UpdateGoal {
                milestones: Some(vec![MilestoneInput {
                    title: "Finish basics course".into(),
                    completed: true,
                    ..Default::default()
                }]),
                ..Default::default()
            },
            earlier,
        );
        let id = goal.milestones[0].id;

        goal.apply(
            UpdateGoal {
                milestones: Some(vec![
                    MilestoneInput {
                        id: Some(id),
                        title: "Finish basics course".into(),
                        completed: true,
                        ..Default::default()
                    },
                    MilestoneInput {
                        title: "Build first app".into(),
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            },
            now,
        );
        assert_eq!(goal.milestones[0].completed_at, Some(earlier));
        assert_eq!(goal.milestones[1].completed_at, None);
    }

    #[test]
    fn best_streak_tracks_current_streak() {
        let mut habit = Habit::new(CreateHabit::named("Morning Exercise"), Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        habit.apply(UpdateHabit {
            current_streak: Some(12),
            ..Default::default()
        });
        assert_eq!((habit.current_streak, habit.best_streak), (12, 12));

        habit.apply(UpdateHabit {
            current_streak: Some(0),
            ..Default::default()
        });
        assert_eq!((habit.current_streak, habit.best_streak), (0, 12));
    }

    #[tokio::test]
    async fn items_attach_to_their_area_and_cascade() {
        let db = DBService::new_in_memory().await.unwrap();
        let health = area(&db, "Health & Fitness").await;
        let career = area(&db, "Career & Work").await;

        let goal = Goal::create(&db.pool, health.id, CreateGoal::titled("Run a 5K"), Uuid::new_v4())
            .await
            .unwrap();
        Habit::create(&db.pool, health.id, CreateHabit::named("Morning Exercise"), Uuid::new_v4())
            .await
            .unwrap();
        let review = AreaReview::create(
            &db.pool,
            health.id,
            CreateAreaReview {
                score: Some(80),
                ..Default::default()
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        assert_eq!(review.review_type, ReviewPeriod::Weekly);

        let detail = LifeArea::find_with_items(&db.pool, health.id).await.unwrap().unwrap();
        assert_eq!(detail.area.current_score, 80);
        assert_eq!((detail.goals.len(), detail.habits.len(), detail.reviews.len()), (1, 1, 1));
        assert!(detail.area.updated_at >= health.updated_at);

        let stats = LifeAreaStats::compute(&LifeArea::find_all_with_items(&db.pool).await.unwrap());
        assert_eq!(stats.total, 2);
        assert_eq!(stats.overall_score, 65);
        assert_eq!((stats.active_goals, stats.active_habits, stats.total_reviews), (1, 1, 1));
        assert_eq!(stats.by_category.health, 1);
        assert_eq!(stats.by_category.career, 1);

        // a goal is only reachable through its own area
        let wrong_area = Goal::update(&db.pool, career.id, goal.id, UpdateGoal::default()).await;
        assert!(matches!(wrong_area, Err(LifeAreaError::ItemNotFound(AreaItem::Goal, id)) if id == goal.id));

        assert_eq!(LifeArea::delete(&db.pool, health.id).await.unwrap(), 1);
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM area_goals")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn unknown_area_or_item_is_reported() {
        let db = DBService::new_in_memory().await.unwrap();
        let missing = Uuid::new_v4();
        assert!(matches!(
            Habit::create(&db.pool, missing, CreateHabit::named("Read"), Uuid::new_v4()).await,
            Err(LifeAreaError::AreaNotFound(id)) if id == missing
        ));

        let health = area(&db, "Health").await;
        let stray = Uuid::new_v4();
        assert!(matches!(
            LifeArea::delete_item(&db.pool, health.id, AreaItem::Review, stray).await,
            Err(LifeAreaError::ItemNotFound(AreaItem::Review, id)) if id == stray
        ));
    }

    #[test]
    fn payloads_are_range_checked() {
        assert!(CreateLifeArea::named("Health").validate().is_ok());
        assert_eq!(
            CreateLifeArea {
                target_score: Some(120),
                ..CreateLifeArea::named("Health")
            }
            .validate()
            .unwrap_err(),
            "Target score must be between 0 and 100"
        );
        assert!(CreateHabit {
            target_count: Some(0),
            ..CreateHabit::named("Read")
        }
        .validate()
        .is_err());
        assert!(UpdateGoal {
            progress: Some(101),
            ..Default::default()
        }
        .validate()
        .is_err());
    }
}
