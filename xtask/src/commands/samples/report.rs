use super::tally::{CheckTally, FailureRecord};
use super::ReportTarget;
use crate::runtime::context::CommandContext;
use crate::runtime::error::{XtaskError, XtaskResult};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct SamplesReport<'a> {
    generated_at: String,
    command: &'a str,
    checked: &'a [String],
    failures: &'a [FailureRecord],
    error_count: u32,
    exit_code: u8,
}

/// Write the JSON run summary requested with `--report`.
pub(super) fn write_report(
    ctx: &CommandContext,
    target: &ReportTarget,
    command: &str,
    tally: &CheckTally,
) -> XtaskResult<PathBuf> {
    let path = match target {
        ReportTarget::Default => ctx.artifacts().samples_report(),
        ReportTarget::Path(path) => ctx.artifacts().resolve_path(path),
    };
    if let Some(parent) = path.parent() {
        ctx.artifacts().ensure_dir(parent)?;
    }

    let report = SamplesReport {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        command,
        checked: tally.checked(),
        failures: tally.failures(),
        error_count: tally.errors(),
        exit_code: tally.exit_code(),
    };
    let body = serde_json::to_string_pretty(&report)
        .map_err(|err| XtaskError::io(format!("failed to serialize samples report: {err}")))?;
    fs::write(&path, body + "\n").map_err(|err| {
        XtaskError::io(format!("failed to write {}: {err}", path.display())).with_path(&path)
    })?;
    println!("    report: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::samples::test_support::temp_root;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn report_lists_checked_samples_and_failures() {
        let root = temp_root("report");
        let ctx = CommandContext::with_root(root.clone());
        let mut tally = CheckTally::default();
        tally.mark_checked("map/display-map");
        tally.mark_checked("search/find-address");
        tally.fail("search/find-address", "consistency", "stale title".into(), 1);

        let path = write_report(&ctx, &ReportTarget::Default, "check", &tally).expect("report");
        assert_eq!(path, root.join(".artifacts/samples-report.json"));

        let report: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(report["command"], "check");
        assert_eq!(report["checked"].as_array().map(Vec::len), Some(2));
        assert_eq!(report["failures"][0]["kind"], "consistency");
        assert_eq!(report["exit_code"], 1);
        assert!(report["generated_at"]
            .as_str()
            .is_some_and(|stamp| stamp.ends_with('Z')));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn explicit_report_path_is_root_relative() {
        let root = temp_root("report-path");
        let ctx = CommandContext::with_root(root.clone());
        let path = write_report(
            &ctx,
            &ReportTarget::Path("out/samples.json".into()),
            "changed",
            &CheckTally::default(),
        )
        .expect("report");
        assert_eq!(path, root.join("out/samples.json"));
        assert!(path.is_file());

        let _ = fs::remove_dir_all(root);
    }
}
