//! Document sorting workflow.
//!
//! # Responsibility
//! - Expose the ledger, category and filer operations behind one handle.
//! - Run the per-document flow: state check, content read, category list,
//!   categorize, file, mark.
//! - Run that flow over every unsorted ledger entry without letting one
//!   document's failure stop the rest.
//!
//! # Invariants
//! - `File` only runs for documents the ledger reports as `NotSorted`.
//! - `MarkSorted` only runs after `File` reported `Filed`.
//! - A failed mark after a successful copy leaves the document unsorted with
//!   its artifact on disk; re-running the flow overwrites the artifact and
//!   marks it.
//!
//! # Known limitations
//! - Single caller, single process. Nothing locks the ledger or the sorted
//!   tree against a second writer.

use crate::files::category_store::CategoryStore;
use crate::files::filer::{FileOutcome, Filer};
use crate::files::source_dir::SourceDir;
use crate::files::{FilesError, FilesResult};
use crate::model::document::{DocumentFilter, IngestReport, MarkOutcome, SortState};
use crate::repo::ledger_repo::{LedgerError, LedgerRepository, LedgerResult};
use crate::service::categorizer::{CategorizeError, CategorizeRequest, Categorizer};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Non-fatal result of sorting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    /// Ledger already marks the document as sorted; nothing was touched.
    AlreadySorted,
    /// Ledger does not know the document; ingest it first.
    NotFound,
    /// Ledger knows the document but the source file is gone.
    SourceMissing { source: PathBuf },
    /// Document was copied and marked.
    Filed {
        category: String,
        new_name: String,
        destination: PathBuf,
    },
}

/// Failure while sorting one document.
#[derive(Debug)]
pub enum SortError {
    Ledger(LedgerError),
    Files(FilesError),
    Categorize {
        identifier: String,
        source: CategorizeError,
    },
    /// Copy succeeded, mark did not. The artifact exists at `destination`
    /// and the ledger still reports the document as unsorted.
    MarkFailed {
        destination: PathBuf,
        source: LedgerError,
    },
}

impl Display for SortError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ledger(err) => write!(f, "{err}"),
            Self::Files(err) => write!(f, "{err}"),
            Self::Categorize { identifier, source } => {
                write!(f, "categorizer failed for `{identifier}`: {source}")
            }
            Self::MarkFailed {
                destination,
                source,
            } => write!(
                f,
                "filed to {} but could not mark as sorted: {source}",
                destination.display()
            ),
        }
    }
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Ledger(err) => Some(err),
            Self::Files(err) => Some(err),
            Self::Categorize { source, .. } => Some(source),
            Self::MarkFailed { source, .. } => Some(source),
        }
    }
}

impl From<LedgerError> for SortError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<FilesError> for SortError {
    fn from(value: FilesError) -> Self {
        Self::Files(value)
    }
}

/// Per-document result inside a batch run.
#[derive(Debug)]
pub struct BatchEntry {
    pub identifier: String,
    pub result: Result<SortOutcome, SortError>,
}

/// Results of one batch run, in ledger identifier order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// Number of documents filed and marked during the run.
    pub fn filed(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.result, Ok(SortOutcome::Filed { .. })))
            .count()
    }

    /// Number of documents that ended with an error.
    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.result.is_err())
            .count()
    }
}

/// Sorting workflow over one ledger, one source directory and one sorted root.
pub struct SortService<R: LedgerRepository, C: Categorizer> {
    ledger: R,
    source: SourceDir,
    categories: CategoryStore,
    filer: Filer,
    categorizer: C,
}

impl<R: LedgerRepository, C: Categorizer> SortService<R, C> {
    /// Creates a service over `ledger`, reading documents from
    /// `source_root` and filing them under `sorted_root`.
    pub fn new(
        ledger: R,
        source_root: impl Into<PathBuf>,
        sorted_root: impl Into<PathBuf>,
        categorizer: C,
    ) -> Self {
        let source_root = source_root.into();
        let sorted_root = sorted_root.into();
        Self {
            ledger,
            source: SourceDir::new(source_root.clone()),
            categories: CategoryStore::new(sorted_root.clone()),
            filer: Filer::new(source_root, sorted_root),
            categorizer,
        }
    }

    /// Underlying ledger, for reads the service does not wrap.
    pub fn ledger(&self) -> &R {
        &self.ledger
    }

    /// Tri-state sort status of one document.
    pub fn is_sorted(&self, identifier: &str) -> LedgerResult<SortState> {
        self.ledger.sort_state(identifier)
    }

    /// Marks one document as sorted. Call only after `file` reported
    /// `Filed`; the ledger itself does not check.
    pub fn mark_sorted(&self, identifier: &str) -> LedgerResult<MarkOutcome> {
        self.ledger.mark_sorted(identifier)
    }

    /// Registers identifiers not yet known to the ledger.
    pub fn ingest(&self, identifiers: &[String]) -> LedgerResult<IngestReport> {
        self.ledger.ingest(identifiers)
    }

    /// Existing category names, sorted.
    pub fn list_categories(&self) -> FilesResult<Vec<String>> {
        self.categories.list_categories()
    }

    /// Copies one source document into a category under a new name.
    pub fn file(
        &self,
        source_identifier: &str,
        category: &str,
        new_name: &str,
    ) -> FilesResult<FileOutcome> {
        self.filer.file(source_identifier, category, new_name)
    }

    /// Registers every file currently in the source directory.
    pub fn ingest_source_dir(&self) -> Result<IngestReport, SortError> {
        let identifiers = self.source.scan()?;
        Ok(self.ledger.ingest(&identifiers)?)
    }

    /// Sorts one document end to end.
    pub fn sort_document(&self, identifier: &str) -> Result<SortOutcome, SortError> {
        match self.ledger.sort_state(identifier)? {
            SortState::NotFound => {
                info!("event=sort_document module=sort_service status=not_found");
                return Ok(SortOutcome::NotFound);
            }
            SortState::Sorted => {
                info!("event=sort_document module=sort_service status=already_sorted");
                return Ok(SortOutcome::AlreadySorted);
            }
            SortState::NotSorted => {}
        }

        let Some(content) = self.source.read(identifier)? else {
            warn!("event=sort_document module=sort_service status=source_missing stage=read");
            return Ok(SortOutcome::SourceMissing {
                source: self.source.path_of(identifier)?,
            });
        };

        let categories = self.categories.list_categories()?;
        let request = CategorizeRequest {
            identifier,
            content: &content,
            categories: &categories,
        };
        let placement = self.categorizer.categorize(&request).map_err(|source| {
            error!("event=sort_document module=sort_service status=error stage=categorize error={source}");
            SortError::Categorize {
                identifier: identifier.to_string(),
                source,
            }
        })?;

        let (category, destination) =
            match self
                .filer
                .file(identifier, &placement.category, &placement.new_name)?
            {
                FileOutcome::Filed {
                    category,
                    destination,
                } => (category, destination),
                FileOutcome::SourceMissing { source } => {
                    warn!("event=sort_document module=sort_service status=source_missing stage=file");
                    return Ok(SortOutcome::SourceMissing { source });
                }
            };

        match self.ledger.mark_sorted(identifier) {
            Ok(MarkOutcome::Updated) => {}
            Ok(MarkOutcome::NotFound) => {
                return Err(SortError::MarkFailed {
                    destination,
                    source: LedgerError::InvalidData(format!(
                        "`{identifier}` disappeared from the ledger while filing"
                    )),
                });
            }
            Err(source) => {
                error!("event=sort_document module=sort_service status=error stage=mark error={source}");
                return Err(SortError::MarkFailed {
                    destination,
                    source,
                });
            }
        }

        info!("event=sort_document module=sort_service status=filed");
        Ok(SortOutcome::Filed {
            category,
            new_name: placement.new_name,
            destination,
        })
    }

    /// Sorts every document the ledger reports as unsorted.
    ///
    /// Only a failure to list pending documents fails the whole call; each
    /// document's own failure is recorded in its entry.
    pub fn sort_pending(&self) -> LedgerResult<BatchReport> {
        let pending = self.ledger.list_documents(DocumentFilter::Unsorted)?;
        let mut report = BatchReport::default();

        for document in pending {
            let result = self.sort_document(&document.identifier);
            report.entries.push(BatchEntry {
                identifier: document.identifier,
                result,
            });
        }

        info!(
            "event=sort_batch module=sort_service status=ok total={} filed={} failed={}",
            report.entries.len(),
            report.filed(),
            report.failed()
        );
        Ok(report)
    }
}
