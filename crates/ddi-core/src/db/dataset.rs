//! Bulk import of the interaction dataset.
//!
//! The dataset is a TWOSIDES-style CSV with a header row. The identifier
//! columns are `X1` and `X2`; side effects come from `Top_5_Side_Effects`,
//! falling back to `Side_Effects` or `Y`.

use std::fs;
use std::path::Path;

use rusqlite::params;
use thiserror::Error;
use tracing::{info, warn};

use super::interactions::insert_records;
use super::{Database, DbError, InteractionStore};
use crate::models::InteractionRecord;

/// Column holding the first identifier.
const FIRST_ID_COLUMN: &str = "X1";

/// Column holding the second identifier.
const SECOND_ID_COLUMN: &str = "X2";

/// Side-effect columns, in order of preference.
const SIDE_EFFECT_COLUMNS: &[&str] = &["Top_5_Side_Effects", "Side_Effects", "Y"];

/// Dataset import errors.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type DatasetResult<T> = Result<T, DatasetError>;

/// Outcome of an idempotent import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The store already held records; nothing was read.
    AlreadyPopulated { existing: u64 },
    /// Records were loaded from the dataset.
    Imported { inserted: usize, skipped: usize },
}

/// Parsed dataset rows.
#[derive(Debug, Clone, Default)]
pub struct ParsedDataset {
    pub records: Vec<InteractionRecord>,
    /// Rows dropped because an identifier was empty
    pub skipped: usize,
}

impl Database {
    /// Load the dataset at `path` only if the store reports zero records.
    ///
    /// Safe to call on every process start.
    pub fn populate_if_empty<P: AsRef<Path>>(&mut self, path: P) -> DatasetResult<ImportOutcome> {
        let existing = self.count_interactions()?;
        if existing > 0 {
            info!(existing, "interaction store already populated");
            return Ok(ImportOutcome::AlreadyPopulated { existing });
        }

        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::NotFound(path.display().to_string()));
        }

        info!(path = %path.display(), "populating interaction store from dataset");
        let text = fs::read_to_string(path)?;
        let parsed = parse_dataset(&text)?;
        let source = path.display().to_string();

        // Rows and import bookkeeping commit together
        let inserted = self.with_transaction(|tx| -> DatasetResult<usize> {
            let inserted = insert_records(tx, &parsed.records)?;
            let mut update = tx
                .prepare(
                    "UPDATE import_state SET value = ?2, updated_at = datetime('now') WHERE key = ?1",
                )
                .map_err(DbError::from)?;
            update
                .execute(params!["dataset_source", source])
                .map_err(DbError::from)?;
            update
                .execute(params!["dataset_rows", inserted.to_string()])
                .map_err(DbError::from)?;
            Ok(inserted)
        })?;

        if parsed.skipped > 0 {
            warn!(skipped = parsed.skipped, "dataset rows without identifiers were skipped");
        }
        info!(inserted, "interaction store populated");

        Ok(ImportOutcome::Imported {
            inserted,
            skipped: parsed.skipped,
        })
    }
}

/// Parse the dataset CSV text into interaction records.
pub fn parse_dataset(text: &str) -> DatasetResult<ParsedDataset> {
    let rows = parse_csv(text)?;
    let mut rows = rows.into_iter();

    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(ParsedDataset::default()),
    };

    let column = |name: &str| header.iter().position(|h| h.trim() == name);
    let first = column(FIRST_ID_COLUMN)
        .ok_or_else(|| DatasetError::MissingColumn(FIRST_ID_COLUMN.into()))?;
    let second = column(SECOND_ID_COLUMN)
        .ok_or_else(|| DatasetError::MissingColumn(SECOND_ID_COLUMN.into()))?;
    let effects = SIDE_EFFECT_COLUMNS
        .iter()
        .find_map(|name| column(name))
        .ok_or_else(|| DatasetError::MissingColumn(SIDE_EFFECT_COLUMNS.join("|")))?;

    let mut parsed = ParsedDataset::default();
    for row in rows {
        // Blank trailing lines
        if row.len() == 1 && row[0].trim().is_empty() {
            continue;
        }

        let field = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or("");
        let (id1, id2) = (field(first), field(second));
        if id1.is_empty() || id2.is_empty() {
            parsed.skipped += 1;
            continue;
        }

        parsed
            .records
            .push(InteractionRecord::new(id1, id2, field(effects)));
    }

    Ok(parsed)
}

/// Parse RFC 4180 CSV: quoted fields, doubled quotes, embedded newlines.
fn parse_csv(text: &str) -> DatasetResult<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            '"' => {
                return Err(DatasetError::Malformed {
                    line,
                    reason: "quote inside unquoted field".into(),
                })
            }
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                line += 1;
            }
            '\n' => {
                field.push(c);
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(DatasetError::Malformed {
            line,
            reason: "unterminated quoted field".into(),
        });
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}
