//! Database layer for the interaction store.

mod dataset;
mod interactions;
mod schema;

pub use dataset::*;
pub use interactions::*;
pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction.
    pub fn transaction(&mut self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    /// Run `f` inside a transaction, committing only if it succeeds.
    pub fn with_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, E>,
        E: From<DbError>,
    {
        let tx = self.transaction()?;
        let value = f(&tx)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }

    /// Read a value from the import state table.
    pub fn import_state(&self, key: &str) -> DbResult<Option<String>> {
        use rusqlite::OptionalExtension;

        Ok(self
            .conn
            .query_row("SELECT value FROM import_state WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?)
    }

    /// Close the connection, reporting any error instead of swallowing it on drop.
    pub fn close(self) -> DbResult<()> {
        self.conn.close().map_err(|(_, e)| DbError::Sqlite(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"interactions".to_string()));
        assert!(tables.contains(&"import_state".to_string()));
    }

    #[test]
    fn test_import_state_defaults() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.import_state("dataset_rows").unwrap(), Some("0".to_string()));
        assert_eq!(db.import_state("missing").unwrap(), None);
    }

    #[test]
    fn test_with_transaction_rolls_back_on_error() {
        let mut db = Database::open_in_memory().unwrap();

        let result: DbResult<()> = db.with_transaction(|tx| {
            tx.execute(
                "UPDATE import_state SET value = '7' WHERE key = 'dataset_rows'",
                [],
            )?;
            Err(DbError::Unavailable("aborted".into()))
        });

        assert!(result.is_err());
        assert_eq!(db.import_state("dataset_rows").unwrap(), Some("0".to_string()));
    }

    #[test]
    fn test_open_file_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ddi.sqlite3");

        let db = Database::open(&path).unwrap();
        db.close().unwrap();

        assert!(path.exists());
        assert!(Database::open(&path).is_ok());
    }
}
