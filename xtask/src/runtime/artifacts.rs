//! Artifact path management for xtask workflows.

use crate::runtime::error::{XtaskError, XtaskResult};
use std::fs;
use std::path::{Path, PathBuf};

const AUTOMATION_RUNS_DIR: &str = ".artifacts/automation/runs";
const SAMPLES_REPORT: &str = ".artifacts/samples-report.json";

/// Central artifact path policy for xtask.
///
/// Keeps workspace-relative output locations consistent across workflow families. Command
/// domains should use it instead of hard-coding joins from `ctx.root()`.
#[derive(Clone, Debug)]
pub struct ArtifactManager {
    root: PathBuf,
}

impl ArtifactManager {
    /// Create an artifact manager rooted at the workspace.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve a possibly-relative workspace path.
    ///
    /// Absolute paths are preserved, while relative paths are anchored to the workspace root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Run root used by [`WorkflowRecorder`](crate::runtime::workflow::WorkflowRecorder).
    pub fn automation_runs_dir(&self) -> PathBuf {
        self.root.join(AUTOMATION_RUNS_DIR)
    }

    /// Default location of the `--report` summary.
    pub fn samples_report(&self) -> PathBuf {
        self.root.join(SAMPLES_REPORT)
    }

    /// Ensure a directory exists.
    pub fn ensure_dir(&self, path: &Path) -> XtaskResult<()> {
        fs::create_dir_all(path)
            .map_err(|err| XtaskError::io(format!("failed to create {}: {err}", path.display())))
    }
}
