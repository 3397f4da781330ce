// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration of the policy engine.
//!
//! `Config` can be passed into `Purposize::with_config`. It also carries the settings of the
//! SQLite store and the location of the purpose configuration file to bootstrap from.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default database url, an in-memory SQLite database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// Default maximum number of database connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 16;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Audit reads under purposes with logging level `ACCESS` or `ALL`. Single reads can override
    /// this with `ReadRequest::logging`.
    pub logging: bool,

    /// URL of the SQLite database.
    pub database_url: String,

    /// Maximum number of connections in the database pool.
    pub max_connections: u32,

    /// Path to a JSON purpose configuration file.
    pub purposes_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: true,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            purposes_path: None,
        }
    }
}

impl Config {
    /// Parses a JSON configuration, missing keys fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns a builder for the SQLite store configured with this database url and pool size.
    #[cfg(feature = "sqlite")]
    pub fn sqlite_store_builder(&self) -> purposize_store::SqliteStoreBuilder {
        purposize_store::SqliteStoreBuilder::new()
            .database_url(&self.database_url)
            .max_connections(self.max_connections)
    }
}
