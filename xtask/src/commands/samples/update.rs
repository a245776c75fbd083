use super::config::load_samples_config;
use super::run_sample_stage;
use super::scope::{resolve_scope, with_metadata, SampleDir};
use super::tally::CheckTally;
use super::{SampleScope, UpdateOptions};
use crate::runtime::context::CommandContext;
use crate::runtime::error::XtaskResult;
use sample_metadata::reconcile::read_readme;
use sample_metadata::vocabulary::METADATA_FILE;
use sample_metadata::MetadataResult;

/// `samples update`: rewrite each sample's metadata file from its README and source tree.
///
/// `--category` and `--all` only touch samples that already have a metadata file.
pub(super) fn run_update(ctx: &CommandContext, options: UpdateOptions) -> XtaskResult<()> {
    let config = load_samples_config(ctx)?;
    let categories = resolve_scope(ctx, &options.scope, &config.walk)?;
    let single = matches!(options.scope, SampleScope::Single(_));
    let mut tally = CheckTally::default();

    ctx.workflow().with_workflow_run("samples-update", || {
        for category in categories {
            if single {
                for sample in &category.samples {
                    update_sample(ctx, &mut tally, sample)?;
                }
                continue;
            }

            println!("Processing category - `{}`...", category.name);
            let category = with_metadata(category);
            for sample in &category.samples {
                update_sample(ctx, &mut tally, sample)?;
            }
            println!("Category {} updated", category.name);
        }
        tally.finish()
    })
}

fn update_sample(
    ctx: &CommandContext,
    tally: &mut CheckTally,
    sample: &SampleDir,
) -> XtaskResult<()> {
    run_sample_stage(ctx, tally, &format!("Update {}", sample.label), |tally| {
        tally.mark_checked(&sample.label);
        match rewrite_metadata(sample) {
            Ok(()) => {
                println!("Successfully updated {METADATA_FILE}: {}", sample.label);
                report_special_characters(sample);
            }
            Err(err) => tally.fail_metadata(&sample.label, &err),
        }
        Ok(())
    })
}

fn rewrite_metadata(sample: &SampleDir) -> MetadataResult<()> {
    sample_metadata::regenerate(&sample.dir)?.write_to(&sample.dir.join(METADATA_FILE))
}

fn report_special_characters(sample: &SampleDir) {
    if read_readme(&sample.dir).is_ok_and(|fields| fields.has_special_characters()) {
        println!(
            "info: special characters in README title/description - {}",
            sample.label
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::samples::test_support::{temp_root, write, write_sample};
    use crate::runtime::error::XtaskErrorCategory;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn update_repairs_stale_metadata_and_keeps_redirects() {
        let root = temp_root("update-single");
        let sample = write_sample(&root, "map", "display-map");
        let metadata = sample.join(METADATA_FILE);
        let expected = fs::read_to_string(&metadata).expect("read metadata");
        write(
            &metadata,
            r#"{"title": "Old", "redirect_from": "/java/latest/sample-code/display-map.htm"}"#,
        );

        let ctx = CommandContext::with_root(root.clone());
        run_update(
            &ctx,
            UpdateOptions {
                scope: SampleScope::Single("map/display-map".into()),
            },
        )
        .expect("update");

        let updated = fs::read_to_string(&metadata).expect("read metadata");
        assert_eq!(
            updated,
            expected.replace(
                "\"redirect_from\": [],",
                "\"redirect_from\": [\n        \"/java/latest/sample-code/display-map.htm\"\n    ],"
            )
        );
        sample_metadata::check_sample(&sample).expect("updated sample passes the check");

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn category_update_skips_samples_without_metadata_and_counts_failures() {
        let root = temp_root("update-category");
        write_sample(&root, "map", "display-map");
        write(&root.join("map/draft/README.md"), "# Draft\n");
        let broken = write_sample(&root, "map", "open-map");
        write(&broken.join("README.md"), "# Open map\n\nNo image here.\n");

        let ctx = CommandContext::with_root(root.clone());
        let err = run_update(
            &ctx,
            UpdateOptions {
                scope: SampleScope::Category("map".into()),
            },
        )
        .expect_err("one broken README");
        assert_eq!(err.category, XtaskErrorCategory::ChecksFailed);
        assert_eq!(err.exit_status(), 1);
        assert!(!root.join("map/draft").join(METADATA_FILE).exists());

        let _ = fs::remove_dir_all(root);
    }
}
