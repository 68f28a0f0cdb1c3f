use std::str::FromStr;

use sqlx::{
    Error, Pool, Sqlite, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::info;

pub mod filter;
pub mod models;
pub mod seed;

pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Shared handle to the SQLite store. Cheap to clone.
#[derive(Clone)]
pub struct DBService {
    pub pool: Pool<Sqlite>,
}

impl DBService {
    /// Open (or create) the database at `database_url` and apply migrations.
    pub async fn new(database_url: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` is its own database, so keep exactly one alive.
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options.connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!(database_url = %redact_url(database_url), "Database ready");
        Ok(Self { pool })
    }

    pub async fn new_in_memory() -> Result<Self, Error> {
        Self::new(IN_MEMORY_URL).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Drop any query string, which may carry credentials for remote SQLite proxies.
fn redact_url(database_url: &str) -> &str {
    database_url.split('?').next().unwrap_or(database_url)
}
