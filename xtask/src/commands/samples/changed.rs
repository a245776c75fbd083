//! CI entry: map a changed-files list onto the samples it touches and check each once.

use super::config::load_samples_config;
use super::lint::MarkdownLint;
use super::report::write_report;
use super::run_sample_stage;
use super::tally::CheckTally;
use super::{ChangedInput, ChangedOptions};
use crate::runtime::context::CommandContext;
use crate::runtime::error::{XtaskError, XtaskResult};
use sample_metadata::vocabulary::{METADATA_FILE, README_FILE};
use sample_metadata::Category;
use std::collections::BTreeSet;
use std::fs;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum DocKind {
    Readme,
    Metadata,
}

impl DocKind {
    fn canonical_name(self) -> &'static str {
        match self {
            Self::Readme => README_FILE,
            Self::Metadata => METADATA_FILE,
        }
    }
}

/// A changed path that names a sample's README or metadata file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct ChangedDoc {
    pub(super) sample: String,
    pub(super) file_name: String,
    pub(super) kind: DocKind,
}

impl ChangedDoc {
    fn has_canonical_name(&self) -> bool {
        self.file_name == self.kind.canonical_name()
    }

    fn relative_path(&self) -> String {
        format!("{}/{}", self.sample, self.file_name)
    }
}

/// Classify a repository-relative path as `<category>/<sample>/<readme file>`.
///
/// Paths with any other shape, a category outside the vocabulary, or an unrelated filename
/// yield `None`. The filename match is case-insensitive so miscapitalized files still reach
/// the capitalization check.
pub(super) fn classify_changed_path(path: &str) -> Option<ChangedDoc> {
    if path.starts_with('/') {
        return None;
    }
    let segments = path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>();
    let [category, sample, file_name] = segments.as_slice() else {
        return None;
    };
    if segments.contains(&"..") {
        return None;
    }
    Category::from_folder_name(category)?;
    let kind = match file_name.to_lowercase().as_str() {
        "readme.md" => DocKind::Readme,
        "readme.metadata.json" => DocKind::Metadata,
        _ => return None,
    };
    Some(ChangedDoc {
        sample: format!("{category}/{sample}"),
        file_name: file_name.to_string(),
        kind,
    })
}

/// Parse the changed-files JSON array.
pub(super) fn parse_changed_paths(text: &str) -> XtaskResult<Vec<String>> {
    serde_json::from_str::<Vec<String>>(text).map_err(|err| {
        XtaskError::validation(format!("invalid changed-files list: {err}"))
            .with_operation("cargo xtask samples changed")
            .with_hint("pass a JSON array of repository-relative path strings")
    })
}

fn read_changed_paths(ctx: &CommandContext, input: &ChangedInput) -> XtaskResult<Vec<String>> {
    match input {
        ChangedInput::Inline(text) => parse_changed_paths(text),
        ChangedInput::File(path) => {
            let path = ctx.artifacts().resolve_path(path);
            let text = fs::read_to_string(&path).map_err(|err| {
                XtaskError::io(format!("failed to read changed-files list: {err}"))
                    .with_path(&path)
            })?;
            parse_changed_paths(&text)
        }
    }
}

/// `samples changed`: lint and check every sample touched by the changed-files list.
pub(super) fn run_changed(ctx: &CommandContext, options: ChangedOptions) -> XtaskResult<()> {
    let paths = read_changed_paths(ctx, &options.input)?;
    if paths.is_empty() {
        println!("No changed files detected.");
        return Ok(());
    }

    let config = load_samples_config(ctx)?;
    let lint = MarkdownLint::from_config(&config.markdown_lint, options.skip_markdown_lint);
    if !lint.enabled() {
        ctx.workflow().warn("markdown lint disabled for this run");
    }

    let mut tally = CheckTally::default();
    let mut visited = BTreeSet::new();
    ctx.workflow().with_workflow_run("samples-changed", || {
        for path in &paths {
            if !ctx.root().join(path).exists() {
                continue;
            }
            let Some(doc) = classify_changed_path(path) else {
                continue;
            };
            if visited.contains(&doc.sample) {
                continue;
            }

            println!("*** Checking {} ***", doc.sample);
            if !doc.has_canonical_name() {
                tally.fail(
                    &doc.sample,
                    "filename",
                    format!(
                        "{}: filename has wrong capitalization (expected {})",
                        doc.relative_path(),
                        doc.kind.canonical_name()
                    ),
                    1,
                );
                continue;
            }

            visited.insert(doc.sample.clone());
            run_sample_stage(ctx, &mut tally, &format!("Check {}", doc.sample), |tally| {
                if doc.kind == DocKind::Readme {
                    lint.run(ctx, tally, &doc.sample, &doc.relative_path())?;
                }
                tally.check_metadata(&doc.sample, &ctx.root().join(&doc.sample));
                Ok(())
            })?;
        }
        if let Some(target) = &options.report {
            write_report(ctx, target, "changed", &tally)?;
        }
        tally.finish()
    })
}
