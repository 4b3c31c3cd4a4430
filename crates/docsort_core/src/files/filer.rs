//! Filing of source documents into category directories.
//!
//! # Responsibility
//! - Resolve `<sorted_root>/<category>/<new_name>` from raw caller input.
//! - Create the category directory on first use.
//! - Copy the source document into place.
//!
//! # Invariants
//! - Category names are case-folded before they become directory names.
//! - The source is checked before any directory or file is created, so a
//!   missing source leaves the sorted tree untouched.
//! - Filing copies; the source document stays where it was.
//! - The copy keeps the source's permissions and modification time.
//! - An existing artifact with the same name is overwritten (last write
//!   wins). Re-filing the same triple is therefore safe to retry.
//! - The artifact appears under its final name only once fully written.

use super::source_dir::SourceDir;
use super::{FilesError, FilesResult};
use crate::model::name::{normalize_category, validate_plain_name, NameKind};
use log::{error, info, warn};
use serde::Serialize;
use std::fs::{File, Metadata};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

/// Non-fatal filing result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Copy landed at `destination` under the case-folded `category`.
    Filed {
        category: String,
        destination: PathBuf,
    },
    /// Source document does not exist; nothing was created.
    SourceMissing { source: PathBuf },
}

/// Copies documents from a source directory into category directories.
#[derive(Debug, Clone)]
pub struct Filer {
    source: SourceDir,
    sorted_root: PathBuf,
}

impl Filer {
    /// Creates a filer reading from `source_root` and writing under
    /// `sorted_root`. Neither directory has to exist yet.
    pub fn new(source_root: impl Into<PathBuf>, sorted_root: impl Into<PathBuf>) -> Self {
        Self {
            source: SourceDir::new(source_root),
            sorted_root: sorted_root.into(),
        }
    }

    /// Root under which category directories are created.
    pub fn sorted_root(&self) -> &Path {
        &self.sorted_root
    }

    /// Files `source_identifier` under `category` as `new_name`.
    ///
    /// # Errors
    /// - `FilesError::InvalidName` when any name is not a plain file name.
    /// - `FilesError::StorageFault` for any I/O failure other than a missing
    ///   source. No automatic retry.
    pub fn file(
        &self,
        source_identifier: &str,
        category: &str,
        new_name: &str,
    ) -> FilesResult<FileOutcome> {
        let source_path = self.source.path_of(source_identifier)?;
        let category = normalize_category(category)?;
        validate_plain_name(NameKind::NewName, new_name)?;

        let source_meta = match std::fs::metadata(&source_path) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => {
                warn!("event=file_copy module=filer status=source_missing reason=not_a_file");
                return Ok(FileOutcome::SourceMissing {
                    source: source_path,
                });
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("event=file_copy module=filer status=source_missing reason=not_found");
                return Ok(FileOutcome::SourceMissing {
                    source: source_path,
                });
            }
            Err(err) => return Err(FilesError::storage(source_path, err)),
        };

        let started_at = Instant::now();
        let dest_dir = self.sorted_root.join(&category);
        std::fs::create_dir_all(&dest_dir).map_err(|err| {
            error!(
                "event=file_copy module=filer status=error error_code=mkdir_failed category={category} error={err}"
            );
            FilesError::storage(&dest_dir, err)
        })?;

        let destination = dest_dir.join(new_name);
        if let Err(err) = copy_into_place(&source_path, &source_meta, &dest_dir, &destination) {
            error!(
                "event=file_copy module=filer status=error error_code=copy_failed category={category} duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }

        info!(
            "event=file_copy module=filer status=ok category={category} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(FileOutcome::Filed {
            category,
            destination,
        })
    }
}

/// Streams `source` into an anonymous temp file inside `dest_dir`, then
/// renames it over `destination`. The temp file is removed on any failure.
fn copy_into_place(
    source: &Path,
    source_meta: &Metadata,
    dest_dir: &Path,
    destination: &Path,
) -> FilesResult<()> {
    let mut temp =
        NamedTempFile::new_in(dest_dir).map_err(|err| FilesError::storage(dest_dir, err))?;
    let mut reader = File::open(source).map_err(|err| FilesError::storage(source, err))?;
    std::io::copy(&mut reader, temp.as_file_mut())
        .map_err(|err| FilesError::storage(temp.path(), err))?;

    let written = temp.as_file();
    written
        .set_permissions(source_meta.permissions())
        .map_err(|err| FilesError::storage(temp.path(), err))?;
    if let Ok(modified) = source_meta.modified() {
        written
            .set_modified(modified)
            .map_err(|err| FilesError::storage(temp.path(), err))?;
    }

    temp.persist(destination)
        .map_err(|err| FilesError::storage(destination, err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{FileOutcome, Filer};

    #[test]
    fn filing_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        std::fs::write(docs.join("a.txt"), b"alpha").unwrap();

        let filer = Filer::new(&docs, dir.path().join("sorted"));
        let outcome = filer.file("a.txt", "Tech", "a_tech_01.txt").unwrap();
        assert!(matches!(outcome, FileOutcome::Filed { ref category, .. } if category == "tech"));

        let names: Vec<_> = std::fs::read_dir(dir.path().join("sorted").join("tech"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["a_tech_01.txt"]);
    }
}
