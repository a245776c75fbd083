use super::config::MarkdownLintConfig;
use super::tally::CheckTally;
use crate::runtime::context::CommandContext;
use crate::runtime::error::XtaskResult;

/// External Markdown linter invocation (`<program> --style <style> <README>`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct MarkdownLint {
    program: String,
    style: String,
    enabled: bool,
}

impl MarkdownLint {
    pub(super) fn from_config(config: &MarkdownLintConfig, skip: bool) -> Self {
        Self {
            program: config.program.clone(),
            style: config.style.clone(),
            enabled: config.enabled && !skip,
        }
    }

    pub(super) fn enabled(&self) -> bool {
        self.enabled
    }

    fn args(&self, readme: &str) -> Vec<String> {
        vec!["--style".into(), self.style.clone(), readme.to_string()]
    }

    /// Lint `readme` (workspace-relative) and add the linter's exit code to `tally`.
    pub(super) fn run(
        &self,
        ctx: &CommandContext,
        tally: &mut CheckTally,
        sample: &str,
        readme: &str,
    ) -> XtaskResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let code = ctx
            .process()
            .run_status(ctx.root(), &self.program, self.args(readme))
            .map_err(|err| {
                err.with_operation("markdown lint")
                    .with_hint("install the linter or pass --skip-markdown-lint")
            })?;
        if code != 0 {
            tally.fail(
                sample,
                "markdown-lint",
                format!("{readme}: {} exited with code {code}", self.program),
                u32::try_from(code).unwrap_or(1),
            );
        }
        Ok(())
    }
}
