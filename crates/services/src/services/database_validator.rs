//! Startup check that the schema the handlers rely on is in place.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

/// Tables every route depends on.
pub const REQUIRED_TABLES: &[&str] = &[
    "inbox_items",
    "projects",
    "tasks",
    "ideas",
    "notes",
    "note_connections",
    "flashcards",
    "review_sessions",
    "life_areas",
    "area_goals",
    "area_habits",
    "area_reviews",
];

#[derive(Debug, Error)]
pub enum DatabaseValidationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("missing tables: {}", .0.join(", "))]
    MissingTables(Vec<String>),
}

pub struct DatabaseValidator {
    pool: SqlitePool,
}

impl DatabaseValidator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn validate(&self) -> Result<ValidationResult, DatabaseValidationError> {
        let migrations_table_exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'",
        )
        .fetch_one(&self.pool)
        .await?
            > 0;

        if !migrations_table_exists {
            warn!("Database not initialized - _sqlx_migrations table does not exist");
            return Ok(ValidationResult {
                migrations_applied: 0,
                missing_tables: self.validate_tables(REQUIRED_TABLES).await?,
            });
        }

        let migrations_applied =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(&self.pool)
                .await?;
        let missing_tables = self.validate_tables(REQUIRED_TABLES).await?;

        info!(migrations_applied, missing = missing_tables.len(), "Database validation complete");
        Ok(ValidationResult {
            migrations_applied: migrations_applied as usize,
            missing_tables,
        })
    }

    /// Names from `required_tables` that do not exist.
    pub async fn validate_tables(
        &self,
        required_tables: &[&str],
    ) -> Result<Vec<String>, DatabaseValidationError> {
        let mut missing_tables = Vec::new();

        for table in required_tables {
            let exists = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?
                > 0;

            if !exists {
                missing_tables.push(table.to_string());
            }
        }

        Ok(missing_tables)
    }

    /// Fail unless every required table exists.
    pub async fn ensure_ready(&self) -> Result<ValidationResult, DatabaseValidationError> {
        let result = self.validate().await?;
        if result.missing_tables.is_empty() {
            Ok(result)
        } else {
            Err(DatabaseValidationError::MissingTables(result.missing_tables))
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub migrations_applied: usize,
    pub missing_tables: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.migrations_applied > 0 && self.missing_tables.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.migrations_applied == 0 {
            "Database not initialized - migrations need to be run".to_string()
        } else if !self.missing_tables.is_empty() {
            format!("Database missing tables: {}", self.missing_tables.join(", "))
        } else {
            format!("Database OK - {} migrations applied", self.migrations_applied)
        }
    }
}

#[cfg(test)]
mod tests {
    use db::DBService;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    #[tokio::test]
    async fn migrated_database_is_ready() {
        let db = DBService::new_in_memory().await.unwrap();
        let result = DatabaseValidator::new(db.pool.clone()).ensure_ready().await.unwrap();
        assert!(result.is_ok());
        assert!(result.summary().starts_with("Database OK"));
        assert_eq!(result.migrations_applied, 2);
    }

    #[tokio::test]
    async fn empty_database_reports_every_table() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let validator = DatabaseValidator::new(pool);

        let result = validator.validate().await.unwrap();
        assert!(!result.is_ok());
        assert_eq!(result.missing_tables.len(), REQUIRED_TABLES.len());
        assert!(matches!(
            validator.ensure_ready().await,
            Err(DatabaseValidationError::MissingTables(tables)) if tables.len() == REQUIRED_TABLES.len()
        ));
    }
}
