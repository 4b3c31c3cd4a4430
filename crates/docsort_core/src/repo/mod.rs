//! Repository layer for the sort ledger.
//!
//! # Responsibility
//! - Define the ledger contract used by workflow code.
//! - Isolate SQLite query details from orchestration.
//!
//! # Invariants
//! - Identifiers are validated before they are inserted; lookups of names
//!   that could never be inserted report `NotFound`.
//! - Storage faults surface as `LedgerError::StorageUnavailable`, never as a
//!   `NotFound` result.

pub mod ledger_repo;
