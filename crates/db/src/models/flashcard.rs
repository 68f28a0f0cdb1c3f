use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::common::{normalize_labels, require_text};
use crate::filter::{Filter, Searchable};

pub const DEFAULT_EASE: f64 = 2.5;
pub const MIN_EASE: f64 = 1.3;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "card_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CardType {
    #[default]
    Basic,
    Cloze,
    Image,
    Qa,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "card_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CardStatus {
    #[default]
    New,
    Learning,
    Review,
    Suspended,
}

/// How well a card was recalled.
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "rating", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// SM-2 style step: the next interval in days and the new ease factor.
///
/// Ease never drops below [`MIN_EASE`] and "easy" never lifts it above
/// [`DEFAULT_EASE`]. Every rating except "again" on a scheduled card keeps the
/// interval at one day or more.
pub fn schedule(interval: i64, ease: f64, rating: Rating) -> (i64, f64) {
    match rating {
        Rating::Again => (1, round2((ease - 0.2).max(MIN_EASE))),
        Rating::Hard => (
            ((interval as f64 * 1.2).floor() as i64).max(1),
            round2((ease - 0.15).max(MIN_EASE)),
        ),
        Rating::Good if interval == 0 => (1, ease),
        Rating::Good => ((interval as f64 * ease).floor() as i64, ease),
        Rating::Easy => (
            ((interval as f64 * ease * 1.3).floor() as i64).max(1),
            round2((ease + 0.15).min(DEFAULT_EASE)),
        ),
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub status: CardStatus,
    #[sqlx(rename = "interval_days")]
    pub interval: i64, // days
    pub ease_factor: f64,
    pub reviews: i64,
    pub lapses: i64,
    pub due_date: DateTime<Utc>,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Searchable for Flashcard {
    fn title(&self) -> &str {
        &self.front
    }

    fn body(&self) -> &str {
        &self.back
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// One recorded answer to a card.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
    pub id: Uuid,
    pub card_id: Uuid,
    pub rating: Rating,
    pub response_time: i64, // milliseconds
    pub new_interval: i64,
    pub new_ease_factor: f64,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub updated_card: Flashcard,
    pub review_session: ReviewSession,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct CardStatusCounts {
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub suspended: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct CardTypeCounts {
    pub basic: usize,
    pub cloze: usize,
    pub image: usize,
    pub qa: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardStats {
    pub total: usize,
    pub due: usize,
    pub due_today: usize,
    pub by_status: CardStatusCounts,
    pub by_type: CardTypeCounts,
    /// Share of reviews that were not lapses, one decimal, 0 without reviews.
    pub retention_rate: f64,
    /// Two decimals, 0 for an empty deck.
    pub average_ease_factor: f64,
}

impl FlashcardStats {
    pub fn compute(cards: &[Flashcard], now: DateTime<Utc>) -> Self {
        let mut by_status = CardStatusCounts::default();
        let mut by_type = CardTypeCounts::default();
        let (mut reviews, mut lapses, mut ease_sum) = (0, 0, 0.0);

        let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let tomorrow = today + Duration::days(1);

        for card in cards {
            let status = match card.status {
                CardStatus::New => &mut by_status.new,
                CardStatus::Learning => &mut by_status.learning,
                CardStatus::Review => &mut by_status.review,
                CardStatus::Suspended => &mut by_status.suspended,
            };
            *status += 1;
            let kind = match card.card_type {
                CardType::Basic => &mut by_type.basic,
                CardType::Cloze => &mut by_type.cloze,
                CardType::Image => &mut by_type.image,
                CardType::Qa => &mut by_type.qa,
            };
            *kind += 1;
            reviews += card.reviews;
            lapses += card.lapses;
            ease_sum += card.ease_factor;
        }

        let retention_rate = if reviews > 0 {
            (((reviews - lapses) as f64 / reviews as f64) * 1000.0).round() / 10.0
        } else {
            0.0
        };
        let average_ease_factor = if cards.is_empty() {
            0.0
        } else {
            round2(ease_sum / cards.len() as f64)
        };

        Self {
            total: cards.len(),
            due: cards.iter().filter(|c| c.is_due(now)).count(),
            due_today: cards
                .iter()
                .filter(|c| c.due_date >= today && c.due_date < tomorrow)
                .count(),
            by_status,
            by_type,
            retention_rate,
            average_ease_factor,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlashcard {
    pub front: String,
    pub back: String,
    #[serde(rename = "type")]
    pub card_type: Option<CardType>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl CreateFlashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text("Front", &self.front)?;
        require_text("Back", &self.back)
    }
}

/// Content edits. Scheduling fields only change through reviews and resets.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlashcard {
    pub front: Option<String>,
    pub back: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<CardType>,
    pub status: Option<CardStatus>,
    pub tags: Option<Vec<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(as = "Option<String>")]
    pub category: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(as = "Option<String>")]
    pub notes: Option<Option<String>>,
    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateFlashcard {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(front) = &self.front {
            require_text("Front", front)?;
        }
        if let Some(back) = &self.back {
            require_text("Back", back)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardQuery {
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub due_only: Option<String>,
}

impl FlashcardQuery {
    pub fn filter(&self, now: DateTime<Utc>) -> Filter<'static, Flashcard> {
        Filter::new()
            .eq(self.card_type.as_deref(), |c: &Flashcard| c.card_type.to_string())
            .eq(self.status.as_deref(), |c: &Flashcard| c.status.to_string())
            .eq(self.category.as_deref(), |c: &Flashcard| c.category.clone().unwrap_or_default())
            .search(self.search.as_deref())
            .when(self.due_only.as_deref(), move |c: &Flashcard, flag| {
                flag != "true" || c.is_due(now)
            })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, front, back, card_type, status, interval_days, ease_factor, \
     reviews, lapses, due_date, tags, category, notes, last_reviewed, created_at, updated_at FROM flashcards";

impl Flashcard {
    /// A fresh card is due immediately.
    pub fn new(data: CreateFlashcard, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            front: data.front.trim().to_string(),
            back: data.back.trim().to_string(),
            card_type: data.card_type.unwrap_or_default(),
            status: CardStatus::New,
            interval: 0,
            ease_factor: DEFAULT_EASE,
            reviews: 0,
            lapses: 0,
            due_date: now,
            tags: normalize_labels(data.tags.unwrap_or_default()),
            category: data.category,
            notes: data.notes,
            last_reviewed: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Suspended cards are never due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status != CardStatus::Suspended && self.due_date <= now
    }

    pub fn apply(&mut self, changes: UpdateFlashcard, now: DateTime<Utc>) {
        if let Some(front) = changes.front {
            self.front = front.trim().to_string();
        }
        if let Some(back) = changes.back {
            self.back = back.trim().to_string();
        }
        if let Some(card_type) = changes.card_type {
            self.card_type = card_type;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(tags) = changes.tags {
            self.tags = normalize_labels(tags);
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(notes) = changes.notes {
            self.notes = notes;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        self.updated_at = now;
    }

    /// Record an answer and reschedule the card.
    pub fn review(&mut self, rating: Rating, now: DateTime<Utc>) {
        let (interval, ease) = schedule(self.interval, self.ease_factor, rating);
        self.interval = interval;
        self.ease_factor = ease;
        self.reviews += 1;
        if rating == Rating::Again {
            self.lapses += 1;
        }
        self.due_date = now + Duration::days(interval);
        self.last_reviewed = Some(now);
        self.status = if interval > 0 {
            CardStatus::Review
        } else {
            CardStatus::Learning
        };
        self.updated_at = now;
    }

    /// Forget all scheduling history.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.status = CardStatus::New;
        self.interval = 0;
        self.ease_factor = DEFAULT_EASE;
        self.reviews = 0;
        self.lapses = 0;
        self.due_date = now;
        self.last_reviewed = None;
        self.updated_at = now;
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Flashcard>(&format!("{SELECT_COLUMNS} ORDER BY rowid ASC"))
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Flashcard>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// The most overdue card, ties broken by creation order.
    pub async fn find_next_due(
        pool: &SqlitePool,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let cards = Self::find_all(pool).await?;
        Ok(cards
            .into_iter()
            .filter(|c| c.is_due(now))
            .min_by_key(|c| c.due_date))
    }

    pub async fn create(
        pool: &SqlitePool,
        data: CreateFlashcard,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let card = Self::new(data, id, Utc::now());
        sqlx::query(
            r#"INSERT INTO flashcards (id, front, back, card_type, status, interval_days, ease_factor,
                   reviews, lapses, due_date, tags, category, notes, last_reviewed, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"#,
        )
        .bind(card.id)
        .bind(&card.front)
        .bind(&card.back)
        .bind(card.card_type)
        .bind(card.status)
        .bind(card.interval)
        .bind(card.ease_factor)
        .bind(card.reviews)
        .bind(card.lapses)
        .bind(card.due_date)
        .bind(Json(&card.tags))
        .bind(&card.category)
        .bind(&card.notes)
        .bind(card.last_reviewed)
        .bind(card.created_at)
        .bind(card.updated_at)
        .execute(pool)
        .await?;
        Ok(card)
    }

    async fn save<'e, E>(&self, executor: E) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"UPDATE flashcards
               SET front = $2, back = $3, card_type = $4, status = $5, interval_days = $6,
                   ease_factor = $7, reviews = $8, lapses = $9, due_date = $10, tags = $11,
                   category = $12, notes = $13, last_reviewed = $14, updated_at = $15
               WHERE id = $1"#,
        )
        .bind(self.id)
        .bind(&self.front)
        .bind(&self.back)
        .bind(self.card_type)
        .bind(self.status)
        .bind(self.interval)
        .bind(self.ease_factor)
        .bind(self.reviews)
        .bind(self.lapses)
        .bind(self.due_date)
        .bind(Json(&self.tags))
        .bind(&self.category)
        .bind(&self.notes)
        .bind(self.last_reviewed)
        .bind(self.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        changes: UpdateFlashcard,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(mut card) = Self::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        card.apply(changes, Utc::now());
        card.save(&mut *tx).await?;
        tx.commit().await?;
        Ok(Some(card))
    }

    /// Reschedule the card and log the answer in one transaction.
    pub async fn submit_review(
        pool: &SqlitePool,
        id: Uuid,
        rating: Rating,
        response_time: i64,
    ) -> Result<Option<ReviewOutcome>, sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        let Some(mut card) = Self::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        card.review(rating, now);
        card.save(&mut *tx).await?;

        let session = ReviewSession {
            id: Uuid::new_v4(),
            card_id: card.id,
            rating,
            response_time: response_time.max(0),
            new_interval: card.interval,
            new_ease_factor: card.ease_factor,
            reviewed_at: now,
        };
        sqlx::query(
            r#"INSERT INTO review_sessions (id, card_id, rating, response_time, new_interval,
                   new_ease_factor, reviewed_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(session.id)
        .bind(session.card_id)
        .bind(session.rating)
        .bind(session.response_time)
        .bind(session.new_interval)
        .bind(session.new_ease_factor)
        .bind(session.reviewed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(card_id = %card.id, %rating, interval = card.interval, "Card reviewed");
        Ok(Some(ReviewOutcome {
            updated_card: card,
            review_session: session,
        }))
    }

    pub async fn reset_schedule(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(mut card) = Self::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        card.reset(Utc::now());
        card.save(&mut *tx).await?;
        tx.commit().await?;
        Ok(Some(card))
    }

    /// Removes the card and its review history.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM flashcards WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl ReviewSession {
    pub async fn find_for_card(pool: &SqlitePool, card_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ReviewSession>(
            r#"SELECT id, card_id, rating, response_time, new_interval, new_ease_factor, reviewed_at
               FROM review_sessions WHERE card_id = $1 ORDER BY rowid ASC"#,
        )
        .bind(card_id)
        .fetch_all(pool)
        .await
    }
}
