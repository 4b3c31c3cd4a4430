//! Document ledger records and lookup results.
//!
//! # Invariants
//! - `SortState` is never collapsed into a boolean: an unknown identifier is
//!   `NotFound`, distinct from a known but unsorted one.
//! - `sorted_at` is set on the first unsorted -> sorted transition and never
//!   cleared.

use serde::{Deserialize, Serialize};

/// Ledger row for one known source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Source file name, unique within the ledger.
    pub identifier: String,
    pub is_sorted: bool,
    /// Unix epoch milliseconds of ingestion.
    pub created_at: i64,
    /// Unix epoch milliseconds of the first successful mark.
    pub sorted_at: Option<i64>,
}

/// Result of asking the ledger whether a document has been filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortState {
    /// No ledger row exists for the identifier.
    NotFound,
    /// Known document that has not been filed yet.
    NotSorted,
    /// Known document already filed and marked.
    Sorted,
}

impl SortState {
    /// Stable string id used in logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::NotSorted => "not_sorted",
            Self::Sorted => "sorted",
        }
    }
}

/// Result of marking a document as sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkOutcome {
    /// The row exists and is now sorted, whatever its prior value.
    Updated,
    /// No ledger row exists for the identifier.
    NotFound,
}

/// Counts produced by one bulk ingest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Identifiers newly registered as unsorted.
    pub inserted: usize,
    /// Identifiers already present; their flags were left untouched.
    pub skipped: usize,
}

/// Row filter for ledger listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFilter {
    #[default]
    All,
    Sorted,
    Unsorted,
}
