//! Category enumeration under the sorted root.
//!
//! Categories are not persisted anywhere else: the set of categories is
//! exactly the set of directories under the root at query time.

use super::{FilesError, FilesResult};
use log::warn;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read-only view over category directories.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    root: PathBuf,
}

impl CategoryStore {
    /// Creates a store over category directories under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root the categories live under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists category directory names, sorted lexicographically.
    ///
    /// Returns an empty list when the root does not exist yet. Plain files and
    /// entries whose names are not valid UTF-8 are ignored.
    pub fn list_categories(&self) -> FilesResult<Vec<String>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(FilesError::storage(&self.root, err)),
        };

        let mut categories = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| FilesError::storage(&self.root, err))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => categories.push(name),
                Err(raw) => warn!(
                    "event=category_list module=category_store status=skip reason=non_utf8_name name={}",
                    raw.to_string_lossy()
                ),
            }
        }

        categories.sort();
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::CategoryStore;

    #[test]
    fn missing_root_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CategoryStore::new(dir.path().join("sorted"));
        assert!(store.list_categories().unwrap().is_empty());
    }

    #[test]
    fn lists_directories_only_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("tech")).unwrap();
        std::fs::create_dir(dir.path().join("finance")).unwrap();
        std::fs::write(dir.path().join("stray.txt"), b"x").unwrap();

        let store = CategoryStore::new(dir.path());
        assert_eq!(store.list_categories().unwrap(), vec!["finance", "tech"]);
    }
}
