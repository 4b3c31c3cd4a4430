//! Name validation for ledger identifiers and filing targets.
//!
//! Identifiers, category names and filed names all end up as single path
//! components under a configured root, so each must be a plain file name.
//!
//! # Invariants
//! - Accepted names never contain `/`, `\`, NUL or other control characters.
//! - `.` and `..` are rejected.
//! - Category names are trimmed and lower-cased; two spellings that differ
//!   only in case resolve to the same directory.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PLAIN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/\\\x00-\x1F\x7F]+$").expect("valid plain name regex"));

/// Which kind of name failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Identifier,
    Category,
    NewName,
}

impl NameKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Category => "category",
            Self::NewName => "new name",
        }
    }
}

/// Name validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Name is empty after trim.
    Blank(NameKind),
    /// Name contains a separator or control character.
    NotPlain { kind: NameKind, value: String },
    /// Name is `.` or `..`.
    Reserved { kind: NameKind, value: String },
}

impl Display for NameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(kind) => write!(f, "{} must not be blank", kind.as_str()),
            Self::NotPlain { kind, value } => write!(
                f,
                "{} `{}` must be a plain file name without separators or control characters",
                kind.as_str(),
                value.escape_debug()
            ),
            Self::Reserved { kind, value } => {
                write!(f, "{} `{value}` is a reserved path component", kind.as_str())
            }
        }
    }
}

impl Error for NameError {}

/// Validates that `value` can be used as a single path component.
///
/// Returns the input unchanged on success; surrounding whitespace is
/// significant for identifiers and filed names because it is part of the
/// on-disk name.
pub fn validate_plain_name(kind: NameKind, value: &str) -> Result<&str, NameError> {
    if value.trim().is_empty() {
        return Err(NameError::Blank(kind));
    }
    if value == "." || value == ".." {
        return Err(NameError::Reserved {
            kind,
            value: value.to_string(),
        });
    }
    if !PLAIN_NAME_RE.is_match(value) {
        return Err(NameError::NotPlain {
            kind,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Normalizes a category name to its on-disk directory name.
pub fn normalize_category(category: &str) -> Result<String, NameError> {
    let normalized = category.trim().to_lowercase();
    validate_plain_name(NameKind::Category, &normalized)?;
    Ok(normalized)
}
