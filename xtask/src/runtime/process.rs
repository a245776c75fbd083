//! Shared process execution helpers.

use crate::runtime::error::{XtaskError, XtaskResult};
use std::path::Path;
use std::process::Command;

/// Shared process runner used by command modules.
///
/// Commands are echoed as `+ program args`, run from a caller-provided root, and launch
/// failures become [`XtaskError`]s. External linters report findings through their exit code,
/// so [`run_status`](Self::run_status) hands the code back instead of treating a non-zero exit
/// as an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a process runner.
    pub fn new() -> Self {
        Self
    }

    /// Run a process and return its exit code.
    ///
    /// The process inherits the terminal stdio streams. A process killed by a signal reports `1`.
    pub fn run_status(&self, root: &Path, program: &str, args: Vec<String>) -> XtaskResult<i32> {
        self.print_command(program, &args);
        let status = Command::new(program)
            .current_dir(root)
            .args(&args)
            .status()
            .map_err(|err| {
                XtaskError::process_launch(format!("failed to start `{program}`: {err}"))
            })?;
        Ok(status.code().unwrap_or(1))
    }

    /// Print a process invocation in a stable format.
    pub fn print_command(&self, program: &str, args: &[String]) {
        if args.is_empty() {
            println!("+ {program}");
        } else {
            println!("+ {program} {}", args.join(" "));
        }
    }
}
