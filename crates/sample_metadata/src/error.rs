//! Typed failures for sample metadata extraction and reconciliation.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// A README or sample path that does not match the expected shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The head block needs a title, a description and at least one more line.
    #[error("README description parse failure (found {found} non-blank head lines, need 3)")]
    ShortHead {
        /// Number of non-blank lines before the first `## ` heading.
        found: usize,
    },
    /// A required `## ` section is absent.
    #[error("README section `{0}` is missing")]
    MissingSection(&'static str),
    /// A required `## ` section has no usable entries.
    #[error("README section `{0}` is empty")]
    EmptySection(&'static str),
    /// No `![alt](path)` reference anywhere in the document.
    #[error("README has no image reference")]
    MissingImage,
    /// The sample's parent folder is not a known category.
    #[error("invalid category folder name `{0}`")]
    UnknownCategory(String),
    /// The sample path has no parent folder to take a category from.
    #[error("unable to get category folder name from path {0}")]
    NoCategoryFolder(PathBuf),
    /// No source files survived the snippet filters.
    #[error("unable to get source code paths under {0}")]
    NoSnippets(PathBuf),
}

/// Failure kinds raised while checking one sample.
///
/// Every kind is fatal for the sample being processed. Batch callers are expected to report the
/// error with the sample identity, count it, and move on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// Document or path shape mismatch.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// A file is missing, unreadable, or not the structured data it should be.
    #[error("error reading {path}: {reason}")]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },
    /// Structurally present but forbidden value.
    #[error("error in metadata: {0}")]
    Validation(String),
    /// Derived and persisted metadata disagree after leniency rules.
    #[error("error inconsistent metadata - {} (fields: {})", sample.display(), fields.join(", "))]
    Consistency {
        /// Sample directory that failed the comparison.
        sample: PathBuf,
        /// Top-level fields whose values differ.
        fields: Vec<String>,
    },
}

/// Stable short names for [`MetadataError`] kinds, used in reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetadataErrorKind {
    /// [`MetadataError::Parse`].
    Parse,
    /// [`MetadataError::Read`].
    Read,
    /// [`MetadataError::Validation`].
    Validation,
    /// [`MetadataError::Consistency`].
    Consistency,
}

impl MetadataErrorKind {
    /// Lowercase label for machine-readable output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Read => "read",
            Self::Validation => "validation",
            Self::Consistency => "consistency",
        }
    }
}

impl MetadataError {
    /// Create a read error for `path`.
    pub fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Kind of this error.
    pub fn kind(&self) -> MetadataErrorKind {
        match self {
            Self::Parse(_) => MetadataErrorKind::Parse,
            Self::Read { .. } => MetadataErrorKind::Read,
            Self::Validation(_) => MetadataErrorKind::Validation,
            Self::Consistency { .. } => MetadataErrorKind::Consistency,
        }
    }
}
