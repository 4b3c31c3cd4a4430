//! Categorization capability injected into the sorting workflow.
//!
//! The decision of where a document belongs is made outside this crate (a
//! language model, a rule table, a human). The workflow only sees one
//! function-shaped dependency.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input handed to a categorizer for one document.
#[derive(Debug, Clone, Copy)]
pub struct CategorizeRequest<'a> {
    pub identifier: &'a str,
    /// Raw document bytes.
    pub content: &'a [u8],
    /// Existing category names, sorted.
    pub categories: &'a [String],
}

impl CategorizeRequest<'_> {
    /// Document content as text, with invalid UTF-8 replaced.
    pub fn content_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.content)
    }
}

/// Categorizer decision for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Category name as decided; case is folded when filing.
    pub category: String,
    /// File name of the filed copy.
    pub new_name: String,
}

impl Placement {
    pub fn new(category: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            new_name: new_name.into(),
        }
    }
}

/// Categorizer failure, opaque to the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizeError {
    message: String,
}

impl CategorizeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for CategorizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CategorizeError {}

/// Maps a document and the known categories to a placement.
pub trait Categorizer {
    fn categorize(&self, request: &CategorizeRequest<'_>) -> Result<Placement, CategorizeError>;
}

impl<F> Categorizer for F
where
    F: Fn(&CategorizeRequest<'_>) -> Result<Placement, CategorizeError>,
{
    fn categorize(&self, request: &CategorizeRequest<'_>) -> Result<Placement, CategorizeError> {
        self(request)
    }
}
