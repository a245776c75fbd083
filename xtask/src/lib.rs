//! Samples repository maintenance commands (`cargo xtask`).
//!
//! The crate is a small CLI layer over a shared automation runtime. Command modules own
//! workflow-specific policy while [`runtime`] owns process execution, artifact paths,
//! configuration loading, and workflow recording. The consistency rules themselves live in the
//! `sample_metadata` crate.

pub mod cli;
pub mod commands;
pub mod runtime;

use crate::cli::TopLevelCommand;
use crate::commands::samples::SamplesCommand;
use crate::runtime::context::CommandContext;
use crate::runtime::error::XtaskResult;

/// Shared command contract for top-level xtask command families.
///
/// [`XtaskCommand::parse`] is a pure translation from raw CLI arguments into a typed options
/// value; side effects belong in [`XtaskCommand::run`].
pub trait XtaskCommand {
    /// Typed options produced by CLI parsing for the command family.
    type Options;

    /// Parse command-line arguments into typed options.
    ///
    /// Invalid argument shapes are reported as
    /// [`XtaskError::validation`](crate::runtime::error::XtaskError::validation).
    fn parse(args: &[String]) -> XtaskResult<Self::Options>;

    /// Execute the command family using the shared runtime context.
    fn run(ctx: &CommandContext, options: Self::Options) -> XtaskResult<()>;
}

/// Executes the `xtask` binary using the current process arguments.
pub fn execute_from_env() -> XtaskResult<()> {
    let parsed = cli::parse(std::env::args().skip(1).collect())?;

    match parsed {
        TopLevelCommand::Samples(args) => {
            let options = SamplesCommand::parse(&args)?;
            SamplesCommand::run(&CommandContext::new()?, options)
        }
        TopLevelCommand::Help => {
            cli::print_usage();
            Ok(())
        }
    }
}

/// Converts an xtask result into a stable process exit code.
///
/// Failures print the formatted error to stderr. Failed sample checks exit with their count
/// (saturating at 255); every other failure exits with `1`.
pub fn exit_code(result: XtaskResult<()>) -> std::process::ExitCode {
    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::ExitCode::from(err.exit_status())
        }
    }
}
