use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqliteConnection, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::common::{normalize_labels, require_range, require_text};
use crate::filter::{Filter, Searchable};

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("note {0} not found")]
    NoteNotFound(Uuid),
    #[error("a note cannot be connected to itself")]
    SelfConnection,
    #[error("connection already exists")]
    DuplicateConnection,
    #[error("connection not found")]
    ConnectionNotFound,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "note_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoteType {
    #[default]
    Permanent,
    Literature,
    Fleeting,
    Project,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "note_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoteStatus {
    #[default]
    Active,
    Archived,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub status: NoteStatus,
    pub category: String,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub importance: i64, // 1-5
    pub source: Option<String>,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Searchable for Note {
    fn title(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        &self.content
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Note plus the ids of the notes it is linked to, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct NoteWithConnections {
    #[serde(flatten)]
    #[ts(flatten)]
    pub note: Note,
    pub connections: Vec<Uuid>,
}

impl std::ops::Deref for NoteWithConnections {
    type Target = Note;
    fn deref(&self) -> &Self::Target {
        &self.note
    }
}

impl Searchable for NoteWithConnections {
    fn title(&self) -> &str {
        &self.note.title
    }

    fn body(&self) -> &str {
        &self.note.content
    }

    fn tags(&self) -> &[String] {
        &self.note.tags
    }
}

/// Undirected link between two notes. `from`/`to` record who initiated it.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct NoteConnection {
    #[serde(rename = "from")]
    pub from_id: Uuid,
    #[serde(rename = "to")]
    pub to_id: Uuid,
    #[serde(rename = "type")]
    pub connection_type: String,
    pub strength: i64, // 1-5
    pub created_at: DateTime<Utc>,
}

impl NoteConnection {
    pub fn touches(&self, id: Uuid) -> bool {
        self.from_id == id || self.to_id == id
    }

    /// The endpoint that is not `id`.
    pub fn other(&self, id: Uuid) -> Uuid {
        if self.from_id == id { self.to_id } else { self.from_id }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct TypeCounts {
    pub permanent: usize,
    pub literature: usize,
    pub fleeting: usize,
    pub project: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct NoteStats {
    pub total: usize,
    pub by_type: TypeCounts,
    pub by_category: BTreeMap<String, usize>,
    pub connections: usize,
    /// Mean importance rounded to one decimal, 0 for an empty base.
    pub average_importance: f64,
}

/// Categories that are always reported, even with a zero count.
pub const KNOWN_CATEGORIES: [&str; 5] = ["learning", "project", "personal", "professional", "creative"];

impl NoteStats {
    pub fn compute(notes: &[NoteWithConnections], connection_count: usize) -> Self {
        let mut by_type = TypeCounts::default();
        let mut by_category: BTreeMap<String, usize> =
            KNOWN_CATEGORIES.iter().map(|c| (c.to_string(), 0)).collect();
        let mut importance_sum = 0;

        for note in notes {
            let slot = match note.note_type {
                NoteType::Permanent => &mut by_type.permanent,
                NoteType::Literature => &mut by_type.literature,
                NoteType::Fleeting => &mut by_type.fleeting,
                NoteType::Project => &mut by_type.project,
            };
            *slot += 1;
            *by_category.entry(note.category.clone()).or_default() += 1;
            importance_sum += note.importance;
        }

        let average_importance = if notes.is_empty() {
            0.0
        } else {
            ((importance_sum as f64 / notes.len() as f64) * 10.0).round() / 10.0
        };

        Self {
            total: notes.len(),
            by_type,
            by_category,
            connections: connection_count,
            average_importance,
        }
    }
}

/// Single note with its links and the notes on the other end of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct NoteDetail {
    pub note: NoteWithConnections,
    pub connections: Vec<NoteConnection>,
    pub connected_notes: Vec<NoteWithConnections>,
}

fn validate_importance(importance: Option<i64>) -> Result<(), String> {
    match importance {
        Some(value) => require_range("Importance", value, 1, 5),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateNote {
    pub title: String,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<NoteType>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub importance: Option<i64>,
    pub source: Option<String>,
    pub author: Option<String>,
}

impl CreateNote {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text("Title", &self.title)?;
        validate_importance(self.importance)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNote {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<NoteType>,
    pub status: Option<NoteStatus>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub importance: Option<i64>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(as = "Option<String>")]
    pub source: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(as = "Option<String>")]
    pub author: Option<Option<String>>,
}

impl UpdateNote {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            require_text("Title", title)?;
        }
        validate_importance(self.importance)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateConnection {
    pub from: Uuid,
    pub to: Uuid,
    #[serde(rename = "type")]
    pub connection_type: Option<String>,
    pub strength: Option<i64>,
}

impl CreateConnection {
    pub fn between(from: Uuid, to: Uuid) -> Self {
        Self {
            from,
            to,
            connection_type: None,
            strength: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self.strength {
            Some(strength) => require_range("Strength", strength, 1, 5),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct NoteQuery {
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl NoteQuery {
    pub fn filter(&self) -> Filter<'static, NoteWithConnections> {
        Filter::new()
            .eq(self.note_type.as_deref(), |n: &NoteWithConnections| n.note_type.to_string())
            .eq(self.category.as_deref(), |n: &NoteWithConnections| n.category.clone())
            .eq(self.status.as_deref(), |n: &NoteWithConnections| n.status.to_string())
            .search(self.search.as_deref())
    }
}

const SELECT_COLUMNS: &str = "SELECT id, title, content, note_type, status, category, tags, importance, \
     source, author, created_at, updated_at FROM notes";

const SELECT_CONNECTIONS: &str =
    "SELECT from_id, to_id, connection_type, strength, created_at FROM note_connections";

impl Note {
    pub fn new(data: CreateNote, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: data.title.trim().to_string(),
            content: data.content.unwrap_or_default(),
            note_type: data.note_type.unwrap_or_default(),
            status: NoteStatus::Active,
            category: data.category.unwrap_or_else(|| "learning".to_string()),
            tags: normalize_labels(data.tags.unwrap_or_default()),
            importance: data.importance.unwrap_or(3),
            source: data.source,
            author: data.author,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: UpdateNote, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title.trim().to_string();
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(note_type) = changes.note_type {
            self.note_type = note_type;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(tags) = changes.tags {
            self.tags = normalize_labels(tags);
        }
        if let Some(importance) = changes.importance {
            self.importance = importance;
        }
        if let Some(source) = changes.source {
            self.source = source;
        }
        if let Some(author) = changes.author {
            self.author = author;
        }
        self.updated_at = now;
    }

    fn link(self, connections: &[NoteConnection]) -> NoteWithConnections {
        let linked = connections
            .iter()
            .filter(|c| c.touches(self.id))
            .map(|c| c.other(self.id))
            .collect();
        NoteWithConnections {
            note: self,
            connections: linked,
        }
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Note>(&format!("{SELECT_COLUMNS} ORDER BY rowid ASC"))
            .fetch_all(pool)
            .await
    }

    /// Every note with its derived connection list, plus all connections.
    pub async fn find_all_linked(
        pool: &SqlitePool,
    ) -> Result<(Vec<NoteWithConnections>, Vec<NoteConnection>), sqlx::Error> {
        let notes = Self::find_all(pool).await?;
        let connections = NoteConnection::find_all(pool).await?;
        let linked = notes.into_iter().map(|n| n.link(&connections)).collect();
        Ok((linked, connections))
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Note>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_linked(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<NoteWithConnections>, sqlx::Error> {
        let Some(note) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let connections = NoteConnection::find_for_note(pool, id).await?;
        Ok(Some(note.link(&connections)))
    }

    pub async fn find_detail(pool: &SqlitePool, id: Uuid) -> Result<Option<NoteDetail>, sqlx::Error> {
        let (notes, all_connections) = Self::find_all_linked(pool).await?;
        let mut by_id: HashMap<Uuid, NoteWithConnections> =
            notes.into_iter().map(|n| (n.id, n)).collect();
        let Some(note) = by_id.get(&id).cloned() else {
            return Ok(None);
        };

        let connections: Vec<NoteConnection> = all_connections
            .into_iter()
            .filter(|c| c.touches(id))
            .collect();
        let connected_notes = connections
            .iter()
            .filter_map(|c| by_id.remove(&c.other(id)))
            .collect();

        Ok(Some(NoteDetail {
            note,
            connections,
            connected_notes,
        }))
    }

    pub async fn create(
        pool: &SqlitePool,
        data: CreateNote,
        id: Uuid,
    ) -> Result<NoteWithConnections, sqlx::Error> {
        let note = Self::new(data, id, Utc::now());
        sqlx::query(
            r#"INSERT INTO notes (id, title, content, note_type, status, category, tags, importance,
                   source, author, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
        )
        .bind(note.id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.note_type)
        .bind(note.status)
        .bind(&note.category)
        .bind(Json(&note.tags))
        .bind(note.importance)
        .bind(&note.source)
        .bind(&note.author)
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(pool)
        .await?;
        Ok(note.link(&[]))
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        changes: UpdateNote,
    ) -> Result<Option<NoteWithConnections>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(mut note) = Self::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        note.apply(changes, Utc::now());

        sqlx::query(
            r#"UPDATE notes
               SET title = $2, content = $3, note_type = $4, status = $5, category = $6,
                   tags = $7, importance = $8, source = $9, author = $10, updated_at = $11
               WHERE id = $1"#,
        )
        .bind(note.id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.note_type)
        .bind(note.status)
        .bind(&note.category)
        .bind(Json(&note.tags))
        .bind(note.importance)
        .bind(&note.source)
        .bind(&note.author)
        .bind(note.updated_at)
        .execute(&mut *tx)
        .await?;

        let connections = NoteConnection::find_for_note(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(Some(note.link(&connections)))
    }

    /// Remove the note and every connection touching it.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let unlinked = sqlx::query("DELETE FROM note_connections WHERE from_id = $1 OR to_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(note_id = %id, unlinked, "Deleted note");
        Ok(result.rows_affected())
    }
}

impl NoteConnection {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, NoteConnection>(&format!("{SELECT_CONNECTIONS} ORDER BY rowid ASC"))
            .fetch_all(pool)
            .await
    }

    pub async fn find_for_note<'e, E>(executor: E, id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, NoteConnection>(&format!(
            "{SELECT_CONNECTIONS} WHERE from_id = $1 OR to_id = $1 ORDER BY rowid ASC"
        ))
        .bind(id)
        .fetch_all(executor)
        .await
    }

    async fn find_pair(
        conn: &mut SqliteConnection,
        a: Uuid,
        b: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, NoteConnection>(&format!(
            "{SELECT_CONNECTIONS} WHERE (from_id = $1 AND to_id = $2) OR (from_id = $2 AND to_id = $1)"
        ))
        .bind(a)
        .bind(b)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Link two existing notes. The pair is unordered, so `b→a` duplicates `a→b`.
    pub async fn create(pool: &SqlitePool, data: CreateConnection) -> Result<Self, NoteError> {
        if data.from == data.to {
            return Err(NoteError::SelfConnection);
        }

        let mut tx = pool.begin().await?;
        for id in [data.from, data.to] {
            if Note::find_by_id(&mut *tx, id).await?.is_none() {
                return Err(NoteError::NoteNotFound(id));
            }
        }
        if Self::find_pair(&mut tx, data.from, data.to).await?.is_some() {
            return Err(NoteError::DuplicateConnection);
        }

        let connection = NoteConnection {
            from_id: data.from,
            to_id: data.to,
            connection_type: data
                .connection_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "related".to_string()),
            strength: data.strength.unwrap_or(3),
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"INSERT INTO note_connections (from_id, to_id, connection_type, strength, created_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(connection.from_id)
        .bind(connection.to_id)
        .bind(&connection.connection_type)
        .bind(connection.strength)
        .bind(connection.created_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(connection)
    }

    pub async fn delete(pool: &SqlitePool, a: Uuid, b: Uuid) -> Result<(), NoteError> {
        let result = sqlx::query(
            "DELETE FROM note_connections WHERE (from_id = $1 AND to_id = $2) OR (from_id = $2 AND to_id = $1)",
        )
        .bind(a)
        .bind(b)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(NoteError::ConnectionNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    async fn note(db: &DBService, title: &str) -> NoteWithConnections {
        Note::create(&db.pool, CreateNote::titled(title), Uuid::new_v4())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn connections_are_undirected_and_unique() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = note(&db, "Zettelkasten").await;
        let b = note(&db, "Smart Notes").await;

        let created = NoteConnection::create(&db.pool, CreateConnection::between(a.id, b.id))
            .await
            .unwrap();
        assert_eq!(created.connection_type, "related");
        assert_eq!(created.strength, 3);

        let reverse = NoteConnection::create(&db.pool, CreateConnection::between(b.id, a.id)).await;
        assert!(matches!(reverse, Err(NoteError::DuplicateConnection)));

        let a_linked = Note::find_linked(&db.pool, a.id).await.unwrap().unwrap();
        let b_linked = Note::find_linked(&db.pool, b.id).await.unwrap().unwrap();
        assert_eq!(a_linked.connections, vec![b.id]);
        assert_eq!(b_linked.connections, vec![a.id]);

        NoteConnection::delete(&db.pool, b.id, a.id).await.unwrap();
        assert!(matches!(
            NoteConnection::delete(&db.pool, a.id, b.id).await,
            Err(NoteError::ConnectionNotFound)
        ));
    }

    #[tokio::test]
    async fn self_and_dangling_connections_are_rejected() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = note(&db, "Atomic Habits").await;

        assert!(matches!(
            NoteConnection::create(&db.pool, CreateConnection::between(a.id, a.id)).await,
            Err(NoteError::SelfConnection)
        ));
        let missing = Uuid::new_v4();
        assert!(matches!(
            NoteConnection::create(&db.pool, CreateConnection::between(a.id, missing)).await,
            Err(NoteError::NoteNotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn deleting_a_note_removes_its_connections() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = note(&db, "A").await;
        let b = note(&db, "B").await;
        let c = note(&db, "C").await;
        NoteConnection::create(&db.pool, CreateConnection::between(a.id, b.id))
            .await
            .unwrap();
        NoteConnection::create(&db.pool, CreateConnection::between(c.id, a.id))
            .await
            .unwrap();

        assert_eq!(Note::delete(&db.pool, a.id).await.unwrap(), 1);

        let (notes, connections) = Note::find_all_linked(&db.pool).await.unwrap();
        assert_eq!(notes.len(), 2);
        assert!(connections.is_empty());
        assert!(notes.iter().all(|n| n.connections.is_empty()));
    }

    #[tokio::test]
    async fn detail_lists_connected_notes() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = note(&db, "A").await;
        let b = note(&db, "B").await;
        note(&db, "unrelated").await;
        NoteConnection::create(
            &db.pool,
            CreateConnection {
                connection_type: Some("expands".into()),
                strength: Some(5),
                ..CreateConnection::between(b.id, a.id)
            },
        )
        .await
        .unwrap();

        let detail = Note::find_detail(&db.pool, a.id).await.unwrap().unwrap();
        assert_eq!(detail.note.connections, vec![b.id]);
        assert_eq!(detail.connections.len(), 1);
        assert_eq!(detail.connected_notes.len(), 1);
        assert_eq!(detail.connected_notes[0].id, b.id);

        assert!(Note::find_detail(&db.pool, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[test]
    fn stats_round_average_importance() {
        let now = Utc::now();
        let notes: Vec<_> = [5, 4, 5, 3]
            .into_iter()
            .map(|importance| {
                Note::new(
                    CreateNote {
                        importance: Some(importance),
                        ..CreateNote::titled("n")
                    },
                    Uuid::new_v4(),
                    now,
                )
                .link(&[])
            })
            .collect();

        let stats = NoteStats::compute(&notes, 3);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_type.permanent, 4);
        assert_eq!(stats.by_category["learning"], 4);
        assert_eq!(stats.by_category["creative"], 0);
        assert_eq!(stats.connections, 3);
        assert!((stats.average_importance - 4.3).abs() < f64::EPSILON);

        assert_eq!(NoteStats::compute(&[], 0).average_importance, 0.0);
    }

    #[test]
    fn connection_wire_format() {
        let json = serde_json::to_value(NoteConnection {
            from_id: Uuid::nil(),
            to_id: Uuid::nil(),
            connection_type: "related".into(),
            strength: 3,
            created_at: Utc::now(),
        })
        .unwrap();
        assert!(json.get("from").is_some());
        assert!(json.get("to").is_some());
        assert_eq!(json["type"], "related");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn importance_is_range_checked() {
        let mut data = CreateNote::titled("x");
        data.importance = Some(6);
        assert_eq!(data.validate().unwrap_err(), "Importance must be between 1 and 5");
        assert!(
            CreateConnection {
                strength: Some(0),
                ..CreateConnection::between(Uuid::new_v4(), Uuid::new_v4())
            }
            .validate()
            .is_err()
        );
    }
}
