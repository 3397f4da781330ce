// SPDX-License-Identifier: MIT OR Apache-2.0

use purposize_core::{LoggingLevelError, RecordId, Value};
use sqlx::migrate::{MigrateDatabase, Migrator};
use sqlx::sqlite::{SqliteArguments, SqlitePoolOptions};
use sqlx::{Sqlite, migrate};
use thiserror::Error;
use tracing::debug;

use crate::validation::SchemaError;

/// Migrations of the metadata relations, embedded from the `migrations` directory of this crate.
static MIGRATOR: Migrator = migrate!();

/// Configures and opens a `SqliteStore`.
///
/// File-backed databases are created when they don't exist yet. Pending metadata migrations are
/// always applied before the store is handed out.
#[derive(Clone, Debug)]
pub struct SqliteStoreBuilder {
    url: String,
    max_connections: u32,
}

impl Default for SqliteStoreBuilder {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".into(),
            max_connections: 16,
        }
    }
}

impl SqliteStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a fresh, isolated in-memory database.
    #[cfg(any(test, feature = "test_utils"))]
    pub fn random_memory_url(mut self) -> Self {
        // Every test gets its own named in-memory database, shared ones leak state between tests.
        // See https://github.com/launchbadge/sqlx/issues/2510
        self.url = format!(
            "sqlite://dbmem{}?mode=memory&cache=private",
            rand::random::<u32>()
        );
        self
    }

    pub fn database_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub async fn build(self) -> Result<SqliteStore, SqliteError> {
        if !Sqlite::database_exists(&self.url).await? {
            debug!(url = %self.url, "create database");
            Sqlite::create_database(&self.url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.url)
            .await?;

        debug!(url = %self.url, "run pending database migrations");
        MIGRATOR.run(&pool).await?;

        Ok(SqliteStore::new(pool))
    }
}

/// SQLite database with connection pool.
///
/// Holds the metadata relations in `*_v1` tables managed by the migrations of this crate. Record
/// tables are created from their `TableSchema` with `create_table`, one column per declared field
/// next to an auto-incrementing `id` primary key.
///
/// This struct can be cloned and used in multiple places in the application. Every cloned instance
/// will re-use the same connection pool.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pub(crate) pool: sqlx::SqlitePool,
}

impl SqliteStore {
    pub(crate) fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Shortcut building an in-memory SQLite database with a randomised name for testing purposes.
    #[cfg(any(test, feature = "test_utils"))]
    pub async fn temporary() -> Self {
        SqliteStoreBuilder::new()
            .random_memory_url()
            .max_connections(1)
            .build()
            .await
            .expect("migrations succeeded")
    }
}

pub(crate) type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Quote a table or column name. Names always originate from a `TableSchema`, values are never
/// interpolated but bound as parameters.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Returns `?, ?, ?` with `len` placeholders.
pub(crate) fn placeholders(len: usize) -> String {
    vec!["?"; len].join(", ")
}

pub(crate) fn bind_value<'q>(query: SqliteQuery<'q>, value: &Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Boolean(value) => query.bind(*value),
        Value::Integer(value) => query.bind(*value),
        Value::Real(value) => query.bind(*value),
        Value::Text(value) => query.bind(value.clone()),
    }
}

#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database and connection error.
    #[error(transparent)]
    Sqlite(#[from] sqlx::Error),

    /// SQL table schema migration error.
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Query or record does not match the table schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("record {1} does not exist in table '{0}'")]
    RecordNotFound(String, RecordId),

    /// Invalid, corrupted data was found in the database. This is a critical error.
    #[error("could not decode corrupted '{0}' value from database: {1}")]
    Decode(String, DecodeError),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    LoggingLevel(#[from] LoggingLevelError),
}
