//! SQLite schema definition.

/// Complete database schema for the interaction store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Interactions (bulk-loaded, read-only from the request path)
-- ============================================================================

CREATE TABLE IF NOT EXISTS interactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    id1 TEXT NOT NULL,                           -- canonical SMILES of first drug
    id2 TEXT NOT NULL,                           -- canonical SMILES of second drug
    side_effects TEXT NOT NULL DEFAULT '',       -- "index: description" segments
    imported_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One index per identifier column serves each arm of the symmetric OR query
CREATE INDEX IF NOT EXISTS idx_interactions_id1 ON interactions(id1);
CREATE INDEX IF NOT EXISTS idx_interactions_id2 ON interactions(id2);
CREATE INDEX IF NOT EXISTS idx_interactions_pair ON interactions(id1, id2);

-- ============================================================================
-- Import State
-- ============================================================================

CREATE TABLE IF NOT EXISTS import_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

INSERT OR IGNORE INTO import_state (key, value) VALUES ('dataset_source', '');
INSERT OR IGNORE INTO import_state (key, value) VALUES ('dataset_rows', '0');
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_pair_indexes_exist() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND tbl_name='interactions'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(indexes.contains(&"idx_interactions_id1".to_string()));
        assert!(indexes.contains(&"idx_interactions_id2".to_string()));
    }
}
