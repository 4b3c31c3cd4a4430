//! Ledger repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Track the sorted/unsorted flag of every known source document.
//! - Register newly discovered documents without touching existing flags.
//!
//! # Invariants
//! - `is_sorted` is monotonic: no statement here writes `0` to an existing row.
//! - `mark_sorted` is idempotent and reports `NotFound` for unknown rows.
//! - `ingest` is insert-if-absent; re-running it never erases sorted flags.
//! - Only `ingest` validates names. Lookups and marks take any string: a name
//!   `ingest` would refuse can never be in the table, so it is `NotFound`.

use crate::db::DbError;
use crate::model::document::{
    DocumentFilter, DocumentRecord, IngestReport, MarkOutcome, SortState,
};
use crate::model::name::{validate_plain_name, NameError, NameKind};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DOCUMENT_SELECT_SQL: &str = "SELECT
    identifier,
    is_sorted,
    created_at,
    sorted_at
FROM documents";

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger operation error.
///
/// Unknown identifiers are not errors; they are reported through
/// `SortState::NotFound` and `MarkOutcome::NotFound`.
#[derive(Debug)]
pub enum LedgerError {
    /// Identifier passed to `ingest` is not a plain file name.
    InvalidName(NameError),
    /// Underlying store could not be read or written.
    StorageUnavailable(DbError),
    /// A persisted row violates ledger invariants.
    InvalidData(String),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "{err}"),
            Self::StorageUnavailable(err) => write!(f, "ledger storage unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted ledger data: {message}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::StorageUnavailable(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<NameError> for LedgerError {
    fn from(value: NameError) -> Self {
        Self::InvalidName(value)
    }
}

impl From<DbError> for LedgerError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(value)
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StorageUnavailable(DbError::Sqlite(value))
    }
}

/// Repository interface for per-document sort state.
pub trait LedgerRepository {
    /// Looks up the tri-state sort status of one document. Read-only.
    fn sort_state(&self, identifier: &str) -> LedgerResult<SortState>;
    /// Marks one known document as sorted.
    fn mark_sorted(&self, identifier: &str) -> LedgerResult<MarkOutcome>;
    /// Registers identifiers that are not yet known, in one transaction.
    fn ingest(&self, identifiers: &[String]) -> LedgerResult<IngestReport>;
    /// Gets the full ledger row for one document.
    fn get_document(&self, identifier: &str) -> LedgerResult<Option<DocumentRecord>>;
    /// Lists ledger rows ordered by identifier.
    fn list_documents(&self, filter: DocumentFilter) -> LedgerResult<Vec<DocumentRecord>>;
}

/// SQLite-backed ledger repository.
pub struct SqliteLedgerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLedgerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LedgerRepository for SqliteLedgerRepository<'_> {
    fn sort_state(&self, identifier: &str) -> LedgerResult<SortState> {
        let flag = self
            .conn
            .query_row(
                "SELECT is_sorted FROM documents WHERE identifier = ?1;",
                [identifier],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match flag {
            None => Ok(SortState::NotFound),
            Some(value) => Ok(if parse_flag(value)? {
                SortState::Sorted
            } else {
                SortState::NotSorted
            }),
        }
    }

    fn mark_sorted(&self, identifier: &str) -> LedgerResult<MarkOutcome> {
        let changed = self.conn.execute(
            "UPDATE documents
             SET
                is_sorted = 1,
                sorted_at = COALESCE(sorted_at, strftime('%s', 'now') * 1000)
             WHERE identifier = ?1;",
            [identifier],
        )?;

        if changed == 0 {
            debug!("event=ledger_mark module=ledger status=not_found");
            return Ok(MarkOutcome::NotFound);
        }

        debug!("event=ledger_mark module=ledger status=ok");
        Ok(MarkOutcome::Updated)
    }

    fn ingest(&self, identifiers: &[String]) -> LedgerResult<IngestReport> {
        for identifier in identifiers {
            validate_plain_name(NameKind::Identifier, identifier)?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut report = IngestReport::default();
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO documents (identifier, is_sorted) VALUES (?1, 0);",
            )?;
            for identifier in identifiers {
                if stmt.execute([identifier.as_str()])? == 0 {
                    report.skipped += 1;
                } else {
                    report.inserted += 1;
                }
            }
        }
        tx.commit()?;

        info!(
            "event=ledger_ingest module=ledger status=ok inserted={} skipped={}",
            report.inserted, report.skipped
        );
        Ok(report)
    }

    fn get_document(&self, identifier: &str) -> LedgerResult<Option<DocumentRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOCUMENT_SELECT_SQL} WHERE identifier = ?1;"))?;
        let mut rows = stmt.query([identifier])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_document_row(row)?));
        }

        Ok(None)
    }

    fn list_documents(&self, filter: DocumentFilter) -> LedgerResult<Vec<DocumentRecord>> {
        let sql = match filter {
            DocumentFilter::All => format!("{DOCUMENT_SELECT_SQL} ORDER BY identifier ASC;"),
            DocumentFilter::Sorted | DocumentFilter::Unsorted => {
                format!("{DOCUMENT_SELECT_SQL} WHERE is_sorted = ?1 ORDER BY identifier ASC;")
            }
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = match filter {
            DocumentFilter::All => stmt.query([])?,
            DocumentFilter::Sorted => stmt.query(params![1_i64])?,
            DocumentFilter::Unsorted => stmt.query(params![0_i64])?,
        };

        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }

        Ok(documents)
    }
}

fn parse_document_row(row: &Row<'_>) -> LedgerResult<DocumentRecord> {
    let is_sorted = parse_flag(row.get("is_sorted")?)?;
    let sorted_at: Option<i64> = row.get("sorted_at")?;
    if is_sorted && sorted_at.is_none() {
        return Err(LedgerError::InvalidData(
            "sorted row is missing documents.sorted_at".to_string(),
        ));
    }

    Ok(DocumentRecord {
        identifier: row.get("identifier")?,
        is_sorted,
        created_at: row.get("created_at")?,
        sorted_at,
    })
}

fn parse_flag(value: i64) -> LedgerResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(LedgerError::InvalidData(format!(
            "invalid is_sorted value `{other}` in documents.is_sorted"
        ))),
    }
}
