use super::config::WalkConfig;
use super::SampleScope;
use crate::runtime::context::CommandContext;
use crate::runtime::error::{XtaskError, XtaskResult};
use sample_metadata::vocabulary::METADATA_FILE;
use sample_metadata::Category;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A sample directory plus the label used in output and reports.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct SampleDir {
    pub(super) dir: PathBuf,
    pub(super) label: String,
}

/// A category folder and the sample directories below it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct CategoryDir {
    pub(super) name: String,
    pub(super) samples: Vec<SampleDir>,
}

/// Expand a scope into category groups, sorted by folder name.
///
/// `--single` yields one unnamed group. Category folders come from the vocabulary only, and
/// configured ignored folders are skipped.
pub(super) fn resolve_scope(
    ctx: &CommandContext,
    scope: &SampleScope,
    walk: &WalkConfig,
) -> XtaskResult<Vec<CategoryDir>> {
    match scope {
        SampleScope::Single(path) => {
            let dir = existing_dir(ctx, path)?;
            Ok(vec![CategoryDir {
                name: String::new(),
                samples: vec![SampleDir {
                    dir,
                    label: display_label(path),
                }],
            }])
        }
        SampleScope::Category(path) => {
            let dir = existing_dir(ctx, path)?;
            Ok(vec![category_dir(&dir)?])
        }
        SampleScope::All(path) => {
            let root = existing_dir(ctx, path)?;
            subdirectories(&root)?
                .into_iter()
                .filter(|(name, _)| !walk.is_ignored(name))
                .filter(|(name, _)| Category::from_folder_name(name).is_some())
                .map(|(_, dir)| category_dir(&dir))
                .collect()
        }
    }
}

/// Keep only samples that already carry a metadata file.
pub(super) fn with_metadata(mut category: CategoryDir) -> CategoryDir {
    category
        .samples
        .retain(|sample| sample.dir.join(METADATA_FILE).is_file());
    category
}

fn category_dir(dir: &Path) -> XtaskResult<CategoryDir> {
    let name = folder_name(dir);
    let samples = subdirectories(dir)?
        .into_iter()
        .map(|(sample, dir)| SampleDir {
            label: format!("{name}/{sample}"),
            dir,
        })
        .collect();
    Ok(CategoryDir { name, samples })
}

fn subdirectories(dir: &Path) -> XtaskResult<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| {
            XtaskError::io(format!("failed to list {}: {err}", dir.display())).with_path(dir)
        })?;
        if entry.file_type().is_dir() {
            found.push((
                entry.file_name().to_string_lossy().into_owned(),
                entry.into_path(),
            ));
        }
    }
    Ok(found)
}

fn existing_dir(ctx: &CommandContext, path: &Path) -> XtaskResult<PathBuf> {
    let dir = ctx.artifacts().resolve_path(path);
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(XtaskError::validation("not a directory").with_path(&dir))
    }
}

fn folder_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

fn display_label(path: &Path) -> String {
    path.to_string_lossy().trim_end_matches('/').replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::samples::test_support::{temp_root, write, write_sample};
    use pretty_assertions::assert_eq;
    use std::fs;

    fn labels(categories: &[CategoryDir]) -> Vec<String> {
        categories
            .iter()
            .flat_map(|category| category.samples.iter().map(|s| s.label.clone()))
            .collect()
    }

    #[test]
    fn all_scope_walks_vocabulary_categories_only() {
        let root = temp_root("scope-all");
        write_sample(&root, "map", "display-map");
        write_sample(&root, "analysis", "viewshed");
        write(&root.join("gradle/wrapper/gradle-wrapper.properties"), "");
        write(&root.join("docs/guide/README.md"), "# Guide\n");
        write(&root.join("map/notes.txt"), "not a sample\n");

        let ctx = CommandContext::with_root(root.clone());
        let categories = resolve_scope(&ctx, &SampleScope::All(".".into()), &WalkConfig::default())
            .expect("resolve");
        assert_eq!(
            categories.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["analysis", "map"]
        );
        assert_eq!(labels(&categories), vec!["analysis/viewshed", "map/display-map"]);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn ignored_folders_win_over_the_vocabulary() {
        let root = temp_root("scope-ignored");
        write_sample(&root, "map", "display-map");
        let walk = WalkConfig {
            ignored_folders: vec!["map".into()],
        };
        let ctx = CommandContext::with_root(root.clone());
        let categories =
            resolve_scope(&ctx, &SampleScope::All(root.clone()), &walk).expect("resolve");
        assert!(categories.is_empty());

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn metadata_filter_drops_bare_directories() {
        let root = temp_root("scope-category");
        write_sample(&root, "map", "display-map");
        write(&root.join("map/draft/README.md"), "# Draft\n");

        let ctx = CommandContext::with_root(root.clone());
        let mut categories =
            resolve_scope(&ctx, &SampleScope::Category("map".into()), &WalkConfig::default())
                .expect("resolve");
        assert_eq!(labels(&categories), vec!["map/display-map", "map/draft"]);
        let filtered = with_metadata(categories.remove(0));
        assert_eq!(labels(&[filtered]), vec!["map/display-map"]);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn single_scope_requires_an_existing_directory() {
        let root = temp_root("scope-single");
        let ctx = CommandContext::with_root(root.clone());
        let err = resolve_scope(
            &ctx,
            &SampleScope::Single("map/missing".into()),
            &WalkConfig::default(),
        )
        .expect_err("missing");
        assert!(err.to_string().contains("not a directory"));

        write_sample(&root, "map", "display-map");
        let categories = resolve_scope(
            &ctx,
            &SampleScope::Single("map/display-map/".into()),
            &WalkConfig::default(),
        )
        .expect("resolve");
        assert_eq!(labels(&categories), vec!["map/display-map"]);

        let _ = fs::remove_dir_all(root);
    }
}
