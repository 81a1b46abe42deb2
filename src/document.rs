//! The source document.

use std::path::Path;

use crate::{Error, Result};

/// Raw markdown content plus the name it was loaded from.
///
/// Immutable once built. The whole file is read into memory up front;
/// a constitution-length document is a few hundred kilobytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    source: String,
    text: String,
}

impl Document {
    /// Wrap text that is already in memory.
    #[must_use]
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    /// Read a UTF-8 markdown file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file is missing, unreadable, or not valid UTF-8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), text))
    }

    /// Where this document came from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The full markdown text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}
