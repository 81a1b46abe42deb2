//! Chunking configuration.
//!
//! All knobs have defaults tuned for a converted constitution: 800-character
//! chunks with 100 characters of overlap, split first on top-level `#` parts.
//!
//! Options can be built in code or read from TOML:
//!
//! ```toml
//! chunk_size = 800
//! chunk_overlap = 100
//! separators = ["\n\n", "\n", ". ", " "]
//! strip_headers = false
//!
//! [[headers_to_split_on]]
//! marker = "#"
//! label = "Part"
//!
//! [[headers_to_split_on]]
//! marker = "##"
//! label = "Article"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, HeaderRule, Result};

/// Separators tried by default, coarsest first.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Default maximum chunk length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 800;

/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Options for the whole chunking pipeline.
///
/// # Examples
///
/// ```rust
/// use charter::{ChunkOptions, HeaderRule};
///
/// let options = ChunkOptions::default()
///     .with_chunk_size(400)
///     .with_chunk_overlap(40)
///     .with_headers(vec![HeaderRule::new("#", "Part"), HeaderRule::new("##", "Article")]);
/// assert!(options.validate().is_ok());
///
/// let bad = ChunkOptions::default().with_chunk_size(50).with_chunk_overlap(100);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChunkOptions {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk to the start of the next.
    pub chunk_overlap: usize,
    /// Separators for recursive splitting, highest priority first.
    ///
    /// An empty string means "cut at the character limit".
    pub separators: Vec<String>,
    /// Heading levels that start a new segment, checked in order.
    pub headers_to_split_on: Vec<HeaderRule>,
    /// Drop heading lines from segment text (they are still kept in metadata).
    pub strip_headers: bool,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| (*s).to_string()).collect(),
            headers_to_split_on: vec![HeaderRule::new("#", "Part")],
            strip_headers: false,
        }
    }
}

impl ChunkOptions {
    /// Set the maximum chunk length.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the overlap between consecutive chunks.
    #[must_use]
    pub fn with_chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.chunk_overlap = chunk_overlap;
        self
    }

    /// Replace the separator hierarchy.
    #[must_use]
    pub fn with_separators(mut self, separators: &[&str]) -> Self {
        self.separators = separators.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Replace the header rules.
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<HeaderRule>) -> Self {
        self.headers_to_split_on = headers;
        self
    }

    /// Set whether heading lines are removed from segment text.
    #[must_use]
    pub fn with_strip_headers(mut self, strip_headers: bool) -> Self {
        self.strip_headers = strip_headers;
        self
    }

    /// Check every option before any text is touched.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidChunkSize`] if `chunk_size == 0`
    /// - [`Error::OverlapExceedsSize`] if `chunk_overlap >= chunk_size`
    /// - [`Error::NoSeparators`] if the separator list is empty
    /// - [`Error::InvalidHeaderMarker`] if a header marker is not a run of `#`
    pub fn validate(&self) -> Result<()> {
        validate_sizes(self.chunk_size, self.chunk_overlap)?;
        if self.separators.is_empty() {
            return Err(Error::NoSeparators);
        }
        for rule in &self.headers_to_split_on {
            rule.validate()?;
        }
        Ok(())
    }

    /// Parse options from TOML; missing keys take their defaults.
    ///
    /// The result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed TOML or unknown keys, and the
    /// validation errors of [`ChunkOptions::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Read and parse a TOML options file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`ChunkOptions::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

pub(crate) fn validate_sizes(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::InvalidChunkSize(chunk_size));
    }
    if chunk_overlap >= chunk_size {
        return Err(Error::OverlapExceedsSize {
            size: chunk_size,
            overlap: chunk_overlap,
        });
    }
    Ok(())
}
