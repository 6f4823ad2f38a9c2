// SQLite-backed key-value storage

use crate::persistence::{PersistenceAdapter, validate_key};
use crate::task::now_ms;
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DB_FILE: &str = "tasklist.db";

/// Local-storage style table: one row per key
pub struct SqliteAdapter {
    db: Connection,
}

impl SqliteAdapter {
    /// Open or create `tasklist.db` inside `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).context("Failed to create data directory")?;

        let db = Connection::open(dir.join(DB_FILE)).context("Failed to open SQLite database")?;
        Self::from_connection(db)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Self::from_connection(db)
    }

    fn from_connection(db: Connection) -> Result<Self> {
        let adapter = Self { db };
        adapter.create_schema()?;
        Ok(adapter)
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }
}

impl PersistenceAdapter for SqliteAdapter {
    fn load(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;

        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get::<_, String>(0))
            .optional()?;

        Ok(value)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;

        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, now_ms()],
        )?;

        debug!(key, bytes = value.len(), "Saved value");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_database() {
        let temp = TempDir::new().unwrap();
        let _adapter = SqliteAdapter::open(temp.path()).unwrap();

        assert!(temp.path().join(DB_FILE).exists());
    }

    #[test]
    fn test_missing_key() {
        let adapter = SqliteAdapter::open_in_memory().unwrap();
        assert_eq!(adapter.load("todos").unwrap(), None);
    }

    #[test]
    fn test_save_overwrites() {
        let mut adapter = SqliteAdapter::open_in_memory().unwrap();

        adapter.save("todos", "[1]").unwrap();
        adapter.save("todos", "[2]").unwrap();

        assert_eq!(adapter.load("todos").unwrap().as_deref(), Some("[2]"));
        let rows: i64 = adapter.db.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0)).unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp = TempDir::new().unwrap();

        {
            let mut adapter = SqliteAdapter::open(temp.path()).unwrap();
            adapter.save("todos", "[]").unwrap();
        }

        let adapter = SqliteAdapter::open(temp.path()).unwrap();
        assert_eq!(adapter.load("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut adapter = SqliteAdapter::open_in_memory().unwrap();

        adapter.save("work", "[1]").unwrap();
        adapter.save("home", "[2]").unwrap();

        assert_eq!(adapter.load("work").unwrap().as_deref(), Some("[1]"));
        assert_eq!(adapter.load("home").unwrap().as_deref(), Some("[2]"));
    }
}
