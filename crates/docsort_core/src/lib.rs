//! Core of the document sorter.
//!
//! Tracks, per source document, whether it has been filed, and files each
//! document into a category directory under a new name. Deciding the
//! category is delegated to a caller-supplied `Categorizer`.

pub mod config;
pub mod db;
pub mod files;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, SorterConfig};
pub use files::category_store::CategoryStore;
pub use files::filer::{FileOutcome, Filer};
pub use files::source_dir::SourceDir;
pub use files::{FilesError, FilesResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{DocumentFilter, DocumentRecord, IngestReport, MarkOutcome, SortState};
pub use model::name::{NameError, NameKind};
pub use repo::ledger_repo::{LedgerError, LedgerRepository, LedgerResult, SqliteLedgerRepository};
pub use service::categorizer::{CategorizeError, CategorizeRequest, Categorizer, Placement};
pub use service::sort_service::{BatchEntry, BatchReport, SortError, SortOutcome, SortService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
