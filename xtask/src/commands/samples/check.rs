use super::config::load_samples_config;
use super::report::write_report;
use super::run_sample_stage;
use super::scope::resolve_scope;
use super::tally::CheckTally;
use super::CheckOptions;
use crate::runtime::context::CommandContext;
use crate::runtime::error::XtaskResult;

/// `samples check`: compare each sample's metadata file with its README and source tree.
pub(super) fn run_check(ctx: &CommandContext, options: CheckOptions) -> XtaskResult<()> {
    let config = load_samples_config(ctx)?;
    let categories = resolve_scope(ctx, &options.scope, &config.walk)?;
    let mut tally = CheckTally::default();

    ctx.workflow().with_workflow_run("samples-check", || {
        for sample in categories.iter().flat_map(|category| &category.samples) {
            run_sample_stage(ctx, &mut tally, &format!("Check {}", sample.label), |tally| {
                tally.check_metadata(&sample.label, &sample.dir);
                Ok(())
            })?;
        }
        if let Some(target) = &options.report {
            write_report(ctx, target, "check", &tally)?;
        }
        tally.finish()
    })
}
