//! Filesystem side of sorting: source documents, categories and filed copies.
//!
//! # Responsibility
//! - Enumerate source documents and existing categories.
//! - Copy a source document into a category directory under a new name.
//!
//! # Invariants
//! - Every path built here is `<root>/<plain name>`; names are validated
//!   before touching the filesystem.
//! - Nothing here reads or writes the ledger.

use crate::model::name::NameError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub mod category_store;
pub mod filer;
pub mod source_dir;

pub type FilesResult<T> = Result<T, FilesError>;

/// Filesystem operation error.
#[derive(Debug)]
pub enum FilesError {
    /// Identifier, category or new name is not a plain file name.
    InvalidName(NameError),
    /// Configured source directory does not exist.
    SourceRootMissing(PathBuf),
    /// Any other I/O failure (permissions, disk full, ...).
    StorageFault { path: PathBuf, source: io::Error },
}

impl FilesError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StorageFault {
            path: path.into(),
            source,
        }
    }
}

impl Display for FilesError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "{err}"),
            Self::SourceRootMissing(path) => {
                write!(f, "source directory not found: {}", path.display())
            }
            Self::StorageFault { path, source } => {
                write!(f, "storage fault at {}: {source}", path.display())
            }
        }
    }
}

impl Error for FilesError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::SourceRootMissing(_) => None,
            Self::StorageFault { source, .. } => Some(source),
        }
    }
}

impl From<NameError> for FilesError {
    fn from(value: NameError) -> Self {
        Self::InvalidName(value)
    }
}
