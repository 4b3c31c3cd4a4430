//! Domain model for the sort ledger and filing targets.
//!
//! # Responsibility
//! - Define the records and tri-state results shared by ledger, filer and
//!   workflow code.
//! - Own name validation for identifiers, categories and filed names.
//!
//! # Invariants
//! - A document is identified by its source file name; identifiers are unique.
//! - `sorted` only ever moves from `false` to `true`.

pub mod document;
pub mod name;
