use crate::runtime::error::{XtaskError, XtaskResult};
use sample_metadata::MetadataError;
use serde::Serialize;
use std::path::Path;

/// One counted failure, as printed and as written to the report.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub(super) struct FailureRecord {
    pub(super) sample: String,
    pub(super) kind: String,
    pub(super) message: String,
}

/// Failure accounting shared by every `samples` subcommand.
///
/// `errors` is the exit-code contribution and can exceed the number of failure records: a
/// Markdown lint failure contributes the linter's exit code.
#[derive(Debug, Default)]
pub(super) struct CheckTally {
    errors: u32,
    checked: Vec<String>,
    failures: Vec<FailureRecord>,
}

impl CheckTally {
    pub(super) fn errors(&self) -> u32 {
        self.errors
    }

    pub(super) fn checked(&self) -> &[String] {
        &self.checked
    }

    pub(super) fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    pub(super) fn mark_checked(&mut self, sample: &str) {
        self.checked.push(sample.to_string());
    }

    /// Count a failure and print it as `<n>. <message>`.
    pub(super) fn fail(&mut self, sample: &str, kind: &str, message: String, weight: u32) {
        self.errors = self.errors.saturating_add(weight);
        self.failures.push(FailureRecord {
            sample: sample.to_string(),
            kind: kind.to_string(),
            message,
        });
        if let Some(failure) = self.failures.last() {
            println!("{}. {}", self.failures.len(), failure.message);
        }
    }

    pub(super) fn fail_metadata(&mut self, sample: &str, err: &MetadataError) {
        self.fail(sample, err.kind().as_str(), err.to_string(), 1);
    }

    /// Run the metadata consistency check for one sample directory.
    pub(super) fn check_metadata(&mut self, sample: &str, dir: &Path) {
        self.mark_checked(sample);
        if let Err(err) = sample_metadata::check_sample(dir) {
            self.fail_metadata(sample, &err);
        }
    }

    /// Process exit code this tally maps to.
    pub(super) fn exit_code(&self) -> u8 {
        match self.errors {
            0 => 0,
            errors => XtaskError::checks_failed(errors).exit_status(),
        }
    }

    /// Print the run summary and convert the count into the command result.
    pub(super) fn finish(&self) -> XtaskResult<()> {
        if self.errors == 0 {
            println!("OK");
            return Ok(());
        }
        println!("\nFAILED: {} error(s)", self.errors);
        Err(XtaskError::checks_failed(self.errors))
    }
}
