//! Structured xtask error types.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Stable error categories for xtask workflows.
///
/// These categories are intentionally coarse. They keep user-facing failures understandable and
/// decide the process exit code in [`crate::exit_code`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum XtaskErrorCategory {
    /// Invalid or unreadable configuration.
    Config,
    /// Missing or mismatched local environment prerequisites.
    Environment,
    /// Failure to spawn a child process.
    ProcessLaunch,
    /// Invalid user input or semantically invalid workflow request.
    Validation,
    /// Filesystem or general I/O failure.
    Io,
    /// One or more sample checks failed; the run itself completed.
    ChecksFailed,
}

/// Structured xtask error with contextual metadata.
///
/// The formatted display output is CLI-friendly. Optional `operation`, `target`, and `hint`
/// fields can be attached as the error propagates so failures remain actionable at the point
/// they are shown to the user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct XtaskError {
    /// High-level error category.
    pub category: XtaskErrorCategory,
    /// Human-readable message.
    pub message: String,
    /// Optional operation name.
    pub operation: Option<String>,
    /// Optional path target.
    pub target: Option<String>,
    /// Optional remediation hint.
    pub hint: Option<String>,
    /// Accumulated failure count for [`XtaskErrorCategory::ChecksFailed`].
    pub failures: u32,
}

/// Convenience result type for xtask internals.
pub type XtaskResult<T> = Result<T, XtaskError>;

impl XtaskError {
    /// Create an error with the given category and message.
    pub fn new(category: XtaskErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            operation: None,
            target: None,
            hint: None,
            failures: 0,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(XtaskErrorCategory::Config, message)
    }

    /// Create an environment error.
    pub fn environment(message: impl Into<String>) -> Self {
        Self::new(XtaskErrorCategory::Environment, message)
    }

    /// Create a process launch error.
    pub fn process_launch(message: impl Into<String>) -> Self {
        Self::new(XtaskErrorCategory::ProcessLaunch, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(XtaskErrorCategory::Validation, message)
    }

    /// Create an IO error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(XtaskErrorCategory::Io, message)
    }

    /// Create a checks-failed error carrying the accumulated failure count.
    pub fn checks_failed(failures: u32) -> Self {
        let mut err = Self::new(
            XtaskErrorCategory::ChecksFailed,
            format!("{failures} sample check error(s)"),
        );
        err.failures = failures;
        err
    }

    /// Attach an operation label.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Attach a target path.
    pub fn with_path(mut self, path: &Path) -> Self {
        self.target = Some(path.display().to_string());
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Process exit status for this error.
    ///
    /// Check failures exit with their count, capped at 255; everything else exits with 1.
    pub fn exit_status(&self) -> u8 {
        match self.category {
            XtaskErrorCategory::ChecksFailed => {
                u8::try_from(self.failures.max(1)).unwrap_or(u8::MAX)
            }
            _ => 1,
        }
    }
}

impl Display for XtaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(operation) = &self.operation {
            write!(f, " [operation: {operation}]")?;
        }
        if let Some(target) = &self.target {
            write!(f, " [target: {target}]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " [hint: {hint}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for XtaskError {}

impl From<std::io::Error> for XtaskError {
    fn from(value: std::io::Error) -> Self {
        XtaskError::io(value.to_string())
    }
}
