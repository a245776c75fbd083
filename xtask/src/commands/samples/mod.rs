//! `cargo xtask samples`: the CI entry for changed files plus whole-tree check and update runs.

mod changed;
mod check;
mod config;
mod lint;
mod report;
mod scope;
mod tally;
#[cfg(test)]
mod test_support;
mod update;

use crate::runtime::context::CommandContext;
use crate::runtime::error::{XtaskError, XtaskErrorCategory, XtaskResult};
use crate::XtaskCommand;
use std::path::PathBuf;
use tally::CheckTally;

/// `cargo xtask samples ...`
pub struct SamplesCommand;

/// Supported `cargo xtask samples` subcommands.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SamplesOptions {
    Changed(ChangedOptions),
    Check(CheckOptions),
    Update(UpdateOptions),
    Help,
}

/// Source of the changed-files JSON array.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChangedInput {
    Inline(String),
    File(PathBuf),
}

/// Options for `samples changed`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangedOptions {
    pub(crate) input: ChangedInput,
    pub(crate) skip_markdown_lint: bool,
    pub(crate) report: Option<ReportTarget>,
}

/// Which sample directories a `check` or `update` run covers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SampleScope {
    Single(PathBuf),
    Category(PathBuf),
    All(PathBuf),
}

/// Options for `samples check`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheckOptions {
    pub(crate) scope: SampleScope,
    pub(crate) report: Option<ReportTarget>,
}

/// Options for `samples update`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateOptions {
    pub(crate) scope: SampleScope,
}

/// Destination of a `--report` summary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReportTarget {
    Default,
    Path(PathBuf),
}

impl XtaskCommand for SamplesCommand {
    type Options = SamplesOptions;

    fn parse(args: &[String]) -> XtaskResult<Self::Options> {
        parse_samples_options(args)
    }

    fn run(ctx: &CommandContext, options: Self::Options) -> XtaskResult<()> {
        match options {
            SamplesOptions::Changed(options) => changed::run_changed(ctx, options),
            SamplesOptions::Check(options) => check::run_check(ctx, options),
            SamplesOptions::Update(options) => update::run_update(ctx, options),
            SamplesOptions::Help => {
                print_samples_usage();
                Ok(())
            }
        }
    }
}

fn parse_samples_options(args: &[String]) -> XtaskResult<SamplesOptions> {
    let rest = args.get(1..).unwrap_or_default();
    match args.first().map(String::as_str) {
        Some("changed") => parse_changed_options(rest).map(SamplesOptions::Changed),
        Some("check") => parse_check_options(rest).map(SamplesOptions::Check),
        Some("update") => parse_update_options(rest).map(SamplesOptions::Update),
        None | Some("help" | "--help" | "-h") => Ok(SamplesOptions::Help),
        Some(other) => Err(XtaskError::validation(format!(
            "unknown samples subcommand: {other}"
        ))
        .with_hint("run `cargo xtask samples help`")),
    }
}

fn parse_changed_options(args: &[String]) -> XtaskResult<ChangedOptions> {
    let mut input = None;
    let mut skip_markdown_lint = false;
    let mut report = None;
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--string" => {
                let value = flag_value(args, &mut index, "--string")?;
                set_once(&mut input, ChangedInput::Inline(value), "--string/--file")?;
            }
            "--file" => {
                let value = flag_value(args, &mut index, "--file")?;
                set_once(&mut input, ChangedInput::File(value.into()), "--string/--file")?;
            }
            "--skip-markdown-lint" => skip_markdown_lint = true,
            "--report" => report = Some(report_target(args, &mut index)),
            other => return Err(unknown_argument("changed", other)),
        }
        index += 1;
    }

    let Some(input) = input else {
        return Err(XtaskError::validation("missing `--string <json>` or `--file <path>`")
            .with_operation("cargo xtask samples changed")
            .with_hint("pass a JSON array of repository-relative paths"));
    };
    Ok(ChangedOptions {
        input,
        skip_markdown_lint,
        report,
    })
}

fn parse_check_options(args: &[String]) -> XtaskResult<CheckOptions> {
    let mut scope = None;
    let mut report = None;
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--report" => report = Some(report_target(args, &mut index)),
            flag => match parse_scope_flag(args, &mut index, flag)? {
                Some(parsed) => set_once(&mut scope, parsed, SCOPE_FLAGS)?,
                None => return Err(unknown_argument("check", flag)),
            },
        }
        index += 1;
    }
    Ok(CheckOptions {
        scope: require_scope(scope, "check")?,
        report,
    })
}

fn parse_update_options(args: &[String]) -> XtaskResult<UpdateOptions> {
    let mut scope = None;
    let mut index = 0;
    while index < args.len() {
        let flag = args[index].as_str();
        match parse_scope_flag(args, &mut index, flag)? {
            Some(parsed) => set_once(&mut scope, parsed, SCOPE_FLAGS)?,
            None => return Err(unknown_argument("update", flag)),
        }
        index += 1;
    }
    Ok(UpdateOptions {
        scope: require_scope(scope, "update")?,
    })
}

const SCOPE_FLAGS: &str = "--single/--category/--all";

fn parse_scope_flag(
    args: &[String],
    index: &mut usize,
    flag: &str,
) -> XtaskResult<Option<SampleScope>> {
    let scope = match flag {
        "--single" => SampleScope::Single(flag_value(args, index, flag)?.into()),
        "--category" => SampleScope::Category(flag_value(args, index, flag)?.into()),
        "--all" => SampleScope::All(flag_value(args, index, flag)?.into()),
        _ => return Ok(None),
    };
    Ok(Some(scope))
}

fn require_scope(scope: Option<SampleScope>, subcommand: &str) -> XtaskResult<SampleScope> {
    scope.ok_or_else(|| {
        XtaskError::validation(format!("missing one of {SCOPE_FLAGS}"))
            .with_operation(format!("cargo xtask samples {subcommand}"))
    })
}

fn flag_value(args: &[String], index: &mut usize, flag: &str) -> XtaskResult<String> {
    *index += 1;
    args.get(*index)
        .cloned()
        .ok_or_else(|| XtaskError::validation(format!("missing value for `{flag}`")))
}

/// `--report` takes an optional path; a following flag starts the next option instead.
fn report_target(args: &[String], index: &mut usize) -> ReportTarget {
    match args.get(*index + 1) {
        Some(value) if !value.starts_with("--") => {
            *index += 1;
            ReportTarget::Path(value.into())
        }
        _ => ReportTarget::Default,
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, flags: &str) -> XtaskResult<()> {
    if slot.is_some() {
        return Err(XtaskError::validation(format!(
            "pass exactly one of {flags}"
        )));
    }
    *slot = Some(value);
    Ok(())
}

fn unknown_argument(subcommand: &str, arg: &str) -> XtaskError {
    XtaskError::validation(format!("unknown argument for `samples {subcommand}`: {arg}"))
        .with_hint("run `cargo xtask samples help`")
}

fn print_samples_usage() {
    eprintln!(
        "Usage: cargo xtask samples <subcommand>\n\
         \n\
         Subcommands:\n\
           changed --string <json> | --file <path> [--skip-markdown-lint] [--report [path]]\n\
                                 CI entry: check the samples touched by a JSON array of changed paths\n\
           check --single <dir> | --category <dir> | --all <root> [--report [path]]\n\
                                 Compare README.metadata.json with the README and source tree\n\
           update --single <dir> | --category <dir> | --all <root>\n\
                                 Regenerate README.metadata.json, keeping `redirect_from`\n\
         \n\
         Exit status is the number of errors found (capped at 255).\n\
         Markdown lint settings live in `tools/samples/checks.toml`.\n"
    );
}

/// Run one sample's work as a recorded workflow stage.
///
/// Errors the action adds to `tally` mark the stage as failed without stopping the run. Any
/// other error aborts the run.
fn run_sample_stage<F>(
    ctx: &CommandContext,
    tally: &mut CheckTally,
    stage: &str,
    action: F,
) -> XtaskResult<()>
where
    F: FnOnce(&mut CheckTally) -> XtaskResult<()>,
{
    let before = tally.errors();
    let result = ctx.workflow().stage(stage, || {
        action(&mut *tally)?;
        match tally.errors() - before {
            0 => Ok(()),
            added => Err(XtaskError::checks_failed(added)),
        }
    });
    match result {
        Err(err) if err.category != XtaskErrorCategory::ChecksFailed => Err(err),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_changed_inline_input_with_flags() {
        let parsed = parse_samples_options(&args(&[
            "changed",
            "--string",
            r#"["map/display-map/README.md"]"#,
            "--skip-markdown-lint",
            "--report",
        ]))
        .expect("parse");
        assert_eq!(
            parsed,
            SamplesOptions::Changed(ChangedOptions {
                input: ChangedInput::Inline(r#"["map/display-map/README.md"]"#.into()),
                skip_markdown_lint: true,
                report: Some(ReportTarget::Default),
            })
        );
    }

    #[test]
    fn report_flag_takes_an_optional_path() {
        let parsed = parse_samples_options(&args(&[
            "check",
            "--report",
            "out/report.json",
            "--all",
            ".",
        ]))
        .expect("parse");
        assert_eq!(
            parsed,
            SamplesOptions::Check(CheckOptions {
                scope: SampleScope::All(".".into()),
                report: Some(ReportTarget::Path("out/report.json".into())),
            })
        );
    }

    #[test]
    fn changed_requires_an_input() {
        let err = parse_samples_options(&args(&["changed", "--skip-markdown-lint"]))
            .expect_err("missing input");
        assert!(err.to_string().contains("missing `--string <json>`"));
    }

    #[test]
    fn scope_flags_are_mutually_exclusive() {
        let err = parse_samples_options(&args(&["update", "--single", "a/b", "--all", "."]))
            .expect_err("two scopes");
        assert!(err.to_string().contains("pass exactly one of"));

        let err = parse_samples_options(&args(&["update"])).expect_err("no scope");
        assert!(err.to_string().contains("missing one of"));
    }

    #[test]
    fn flags_need_values() {
        let err = parse_samples_options(&args(&["check", "--single"])).expect_err("no value");
        assert!(err.to_string().contains("missing value for `--single`"));
    }

    #[test]
    fn unknown_subcommands_and_arguments_are_rejected() {
        assert!(parse_samples_options(&args(&["lint"])).is_err());
        let err = parse_samples_options(&args(&["update", "--report"])).expect_err("no report");
        assert!(err.to_string().contains("unknown argument for `samples update`"));
        assert_eq!(
            parse_samples_options(&[]).expect("help"),
            SamplesOptions::Help
        );
    }
}
