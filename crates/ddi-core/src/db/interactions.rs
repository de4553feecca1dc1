//! Interaction store operations.

use rusqlite::{params, OptionalExtension, Row, Transaction};
use tracing::debug;

use super::{Database, DbResult};
use crate::models::InteractionRecord;

/// Read access to interaction records keyed by an unordered identifier pair.
pub trait InteractionStore: Send {
    /// Find the first record for `{a, b}` in either column order.
    fn find_pair(&self, a: &str, b: &str) -> DbResult<Option<InteractionRecord>>;

    /// Number of stored records.
    fn count_interactions(&self) -> DbResult<u64>;
}

impl InteractionStore for Database {
    fn find_pair(&self, a: &str, b: &str) -> DbResult<Option<InteractionRecord>> {
        // Both orderings are queried; storage order is whatever the dataset had.
        let record = self
            .conn
            .query_row(
                r#"
                SELECT id, id1, id2, side_effects
                FROM interactions
                WHERE (id1 = ?1 AND id2 = ?2) OR (id1 = ?2 AND id2 = ?1)
                ORDER BY id
                LIMIT 1
                "#,
                params![a, b],
                record_from_row,
            )
            .optional()?;

        debug!(found = record.is_some(), "interaction pair query");
        Ok(record)
    }

    fn count_interactions(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM interactions", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

impl Database {
    /// Insert a single interaction record, returning its row id.
    pub fn insert_interaction(&self, record: &InteractionRecord) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO interactions (id1, id2, side_effects) VALUES (?1, ?2, ?3)",
            params![record.id1, record.id2, record.side_effects],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert many records in one transaction.
    pub fn insert_interactions(&mut self, records: &[InteractionRecord]) -> DbResult<usize> {
        self.with_transaction(|tx| insert_records(tx, records))
    }
}

/// Insert records through an open transaction.
pub(crate) fn insert_records(tx: &Transaction<'_>, records: &[InteractionRecord]) -> DbResult<usize> {
    let mut stmt =
        tx.prepare("INSERT INTO interactions (id1, id2, side_effects) VALUES (?1, ?2, ?3)")?;
    for record in records {
        stmt.execute(params![record.id1, record.id2, record.side_effects])?;
    }
    Ok(records.len())
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<InteractionRecord> {
    Ok(InteractionRecord {
        id: row.get(0)?,
        id1: row.get(1)?,
        id2: row.get(2)?,
        side_effects: row.get(3)?,
    })
}
