use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::common::{Priority, normalize_labels, require_text};
use crate::filter::{Filter, Searchable};

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "inbox_item_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InboxItemType {
    #[default]
    Information,
    Task,
    Idea,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "inbox_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InboxStatus {
    #[default]
    Unprocessed,
    Processing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct InboxItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: InboxItemType,
    pub priority: Priority,
    pub status: InboxStatus,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub source: String,
    pub processed_at: Option<DateTime<Utc>>, // set when the item reaches `completed`
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Searchable for InboxItem {
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
pub struct CreateInboxItem {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<InboxItemType>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub source: Option<String>,
}

impl CreateInboxItem {
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
pub struct UpdateInboxItem {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<InboxItemType>,
    pub priority: Option<Priority>,
    pub status: Option<InboxStatus>,
    pub tags: Option<Vec<String>>,
    pub source: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl UpdateInboxItem {
    pub fn validate(&self) -> Result<(), String> {
        match &self.title {
            Some(title) => require_text("Title", title),
            None => Ok(()),
        }
    }
}

/// Query parameters accepted by the inbox listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct InboxQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

impl InboxQuery {
    pub fn filter(&self) -> Filter<'static, InboxItem> {
        Filter::new()
            .eq(self.status.as_deref(), |i: &InboxItem| i.status.to_string())
            .eq(self.item_type.as_deref(), |i: &InboxItem| i.item_type.to_string())
            .eq(self.priority.as_deref(), |i: &InboxItem| i.priority.to_string())
            .search(self.search.as_deref())
    }
}

const SELECT_COLUMNS: &str = "SELECT id, title, description, item_type, priority, status, tags, source, \
     processed_at, created_at, updated_at FROM inbox_items";

impl InboxItem {
    pub fn new(data: CreateInboxItem, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: data.title.trim().to_string(),
            description: data.description.unwrap_or_default(),
            item_type: data.item_type.unwrap_or_default(),
            priority: data.priority.unwrap_or_default(),
            status: InboxStatus::Unprocessed,
            tags: normalize_labels(data.tags.unwrap_or_default()),
            source: data.source.unwrap_or_else(|| "manual".to_string()),
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge supplied fields over the record.
    pub fn apply(&mut self, changes: UpdateInboxItem, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(item_type) = changes.item_type {
            self.item_type = item_type;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(tags) = changes.tags {
            self.tags = normalize_labels(tags);
        }
        if let Some(source) = changes.source {
            self.source = source;
        }
        if let Some(status) = changes.status {
            if status == InboxStatus::Completed
                && changes.processed_at.is_none()
                && self.processed_at.is_none()
            {
                self.processed_at = Some(now);
            }
            self.status = status;
        }
        if let Some(processed_at) = changes.processed_at {
            self.processed_at = Some(processed_at);
        }
        self.updated_at = now;
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, InboxItem>(&format!("{SELECT_COLUMNS} ORDER BY rowid ASC"))
            .fetch_all(pool)
            .await
    }

    pub async fn find_filtered(
        pool: &SqlitePool,
        query: &InboxQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let items = Self::find_all(pool).await?;
        Ok(query.filter().apply(items))
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, InboxItem>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: CreateInboxItem,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let item = Self::new(data, id, Utc::now());
        sqlx::query(
            r#"INSERT INTO inbox_items (id, title, description, item_type, priority, status, tags, source, processed_at, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.item_type)
        .bind(item.priority)
        .bind(item.status)
        .bind(Json(&item.tags))
        .bind(&item.source)
        .bind(item.processed_at)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(pool)
        .await?;
        Ok(item)
    }

    /// Read-merge-write in one transaction. `None` when the id is unknown.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        changes: UpdateInboxItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(mut item) = Self::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        item.apply(changes, Utc::now());

        sqlx::query(
            r#"UPDATE inbox_items
               SET title = $2, description = $3, item_type = $4, priority = $5, status = $6,
                   tags = $7, source = $8, processed_at = $9, updated_at = $10
               WHERE id = $1"#,
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.item_type)
        .bind(item.priority)
        .bind(item.status)
        .bind(Json(&item.tags))
        .bind(&item.source)
        .bind(item.processed_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(item))
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM inbox_items WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
