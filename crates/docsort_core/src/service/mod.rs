//! Sorting use-case services.
//!
//! # Responsibility
//! - Sequence ledger, category and filer calls for one document or a batch.
//! - Keep the categorization decision behind an injected `Categorizer`.

pub mod categorizer;
pub mod sort_service;
