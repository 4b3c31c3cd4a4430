//! Source document directory: discovery for ingestion and content reads.
//!
//! Source files are only ever read; filing copies them and leaves the
//! originals in place.

use super::{FilesError, FilesResult};
use crate::model::name::{validate_plain_name, NameKind};
use log::warn;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Unsorted document directory.
#[derive(Debug, Clone)]
pub struct SourceDir {
    root: PathBuf,
}

impl SourceDir {
    /// Creates a view over documents directly under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the documents are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the on-disk path of one source document.
    pub fn path_of(&self, identifier: &str) -> FilesResult<PathBuf> {
        validate_plain_name(NameKind::Identifier, identifier)?;
        Ok(self.root.join(identifier))
    }

    /// Lists regular files directly under the root, sorted by name.
    ///
    /// Subdirectories are not descended into. Names that cannot be used as
    /// ledger identifiers are skipped with a warning.
    pub fn scan(&self) -> FilesResult<Vec<String>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(FilesError::SourceRootMissing(self.root.clone()))
            }
            Err(err) => return Err(FilesError::storage(&self.root, err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| FilesError::storage(&self.root, err))?;
            if !entry.path().is_file() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(
                        "event=source_scan module=source_dir status=skip reason=non_utf8_name name={}",
                        raw.to_string_lossy()
                    );
                    continue;
                }
            };
            if let Err(err) = validate_plain_name(NameKind::Identifier, &name) {
                warn!("event=source_scan module=source_dir status=skip reason=invalid_name error={err}");
                continue;
            }
            names.push(name);
        }

        names.sort();
        Ok(names)
    }

    /// Reads one source document.
    ///
    /// Returns `Ok(None)` when the document is absent.
    pub fn read(&self, identifier: &str) -> FilesResult<Option<Vec<u8>>> {
        let path = self.path_of(identifier)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(FilesError::storage(path, err)),
        }
    }
}
