//! SQLite persistence for the story graph.
//!
//! A [`Store`] owns one connection. Several stores may open the same database
//! file; SQLite serializes their writers. Every operation in this crate runs
//! inside exactly one transaction obtained from [`Store::read`] or
//! [`Store::write`], so a failed step never leaves partial rows behind.
//!
//! Writers begin with `BEGIN IMMEDIATE` and take the database write lock up
//! front. A writer that cannot get the lock within the configured busy timeout
//! fails with [`EngineError::Busy`](crate::EngineError::Busy).

mod rows;
mod schema;

pub(crate) use rows::*;
pub use schema::SCHEMA_VERSION;

use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Handle to the story graph database.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (or create) the database described by `config`.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        Self::open_path(&config.path, Duration::from_millis(config.busy_timeout_ms))
    }

    /// Open (or create) a database file.
    pub fn open_path(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;

        let store = Self::init(conn, Some(path))?;
        debug!(path = ?store.path, "opened story store");
        Ok(store)
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        let store = Self { conn, path };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;
        Ok(())
    }

    /// Database file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stored schema version.
    pub fn schema_version(&self) -> Result<i64> {
        let value: String = self.conn.query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        Ok(value.parse().unwrap_or_default())
    }

    /// Run `f` in a read transaction, giving it one consistent snapshot.
    pub fn read<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Run `f` as one atomic unit of work. Everything `f` wrote is committed
    /// when it returns `Ok`; any error rolls all of it back.
    pub fn write<T>(&mut self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Count rows in one of the graph tables.
    pub fn count(&self, table: Table) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Tables that can be counted through [`Store::count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Players,
    Seasons,
    Locations,
    Decisions,
    Destinations,
    PlayerPositions,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Table::Players => "players",
            Table::Seasons => "seasons",
            Table::Locations => "locations",
            Table::Decisions => "decisions",
            Table::Destinations => "destinations",
            Table::PlayerPositions => "player_positions",
        }
    }
}
