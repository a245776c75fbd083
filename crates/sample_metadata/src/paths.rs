//! Fields derived from the sample directory itself.

use crate::error::{MetadataError, MetadataResult, ParseError};
use crate::vocabulary::{Category, EXCLUDED_PATH_FRAGMENTS, SOURCE_EXTENSIONS};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Fields taken from the filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathFields {
    pub category: Category,
    pub snippets: Vec<String>,
}

/// Derive the category and the snippet list for `sample`.
pub fn derive(sample: &Path) -> MetadataResult<PathFields> {
    Ok(PathFields {
        category: derive_category(sample)?,
        snippets: collect_snippets(sample)?,
    })
}

/// Name of the folder that holds `sample`.
///
/// Relative paths with a single component (such as `.`) are resolved against the current
/// directory first.
pub fn category_folder(sample: &Path) -> MetadataResult<String> {
    let resolved = if sample.components().filter(is_normal).count() >= 2 {
        sample.to_path_buf()
    } else {
        fs::canonicalize(sample).unwrap_or_else(|_| sample.to_path_buf())
    };
    resolved
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ParseError::NoCategoryFolder(sample.to_path_buf()).into())
}

fn is_normal(component: &Component<'_>) -> bool {
    matches!(component, Component::Normal(_))
}

/// Look up the category of `sample` from its parent folder name.
pub fn derive_category(sample: &Path) -> MetadataResult<Category> {
    let folder = category_folder(sample)?;
    Category::from_folder_name(&folder).ok_or_else(|| ParseError::UnknownCategory(folder).into())
}

/// Whether a normalized relative path points at build output or a generated launcher.
pub fn is_excluded(relative: &str) -> bool {
    EXCLUDED_PATH_FRAGMENTS
        .iter()
        .any(|fragment| relative.contains(fragment))
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn to_posix(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Sort snippet paths case-insensitively.
///
/// Paths that differ only by case keep codepoint order between them.
pub fn sort_snippets(mut snippets: Vec<String>) -> Vec<String> {
    snippets.sort();
    snippets.sort_by_key(|path| path.to_lowercase());
    snippets
}

/// Collect the source files of `sample` as `/`-separated paths relative to it.
pub fn collect_snippets(sample: &Path) -> MetadataResult<Vec<String>> {
    let mut snippets = Vec::new();
    for entry in WalkDir::new(sample).follow_links(false) {
        let entry = entry.map_err(|err| MetadataError::read(sample, err))?;
        if !entry.file_type().is_file() || !has_source_extension(entry.path()) {
            continue;
        }
        let relative: PathBuf = entry
            .path()
            .strip_prefix(sample)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        let relative = to_posix(&relative);
        if !is_excluded(&relative) {
            snippets.push(relative);
        }
    }

    if snippets.is_empty() {
        return Err(ParseError::NoSnippets(sample.to_path_buf()).into());
    }
    Ok(sort_snippets(snippets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn category_folder_is_the_parent_directory_name() {
        assert_eq!(
            category_folder(Path::new("samples/map_view/display-map")).expect("folder"),
            "map_view"
        );
        assert_eq!(
            category_folder(Path::new("map_view/display-map/")).expect("folder"),
            "map_view"
        );
    }

    #[test]
    fn derive_category_maps_known_folders() {
        assert_eq!(
            derive_category(Path::new("repo/ogc/wms-layer-url")).expect("category"),
            Category::Ogc
        );
        assert_eq!(
            derive_category(Path::new("repo/network_analysis/offline-routing"))
                .expect("category")
                .display_name(),
            "Network analysis"
        );
    }

    #[test]
    fn derive_category_rejects_unknown_folder() {
        let err = derive_category(Path::new("repo/map-view/display-map")).expect_err("unknown");
        assert_eq!(
            err,
            MetadataError::Parse(ParseError::UnknownCategory("map-view".into()))
        );
    }

    #[test]
    fn exclusion_matches_build_out_and_launcher_fragments() {
        assert!(is_excluded("build/classes/Foo.java"));
        assert!(is_excluded("src/out/Foo.java"));
        assert!(is_excluded("src/main/java/FooLauncher.java"));
        assert!(!is_excluded("src/main/java/Foo.java"));
    }

    #[test]
    fn sort_snippets_is_case_insensitive_with_stable_ties() {
        let sorted = sort_snippets(vec![
            "src/b.fxml".into(),
            "src/Zoo.java".into(),
            "src/B.fxml".into(),
            "src/a.java".into(),
        ]);
        assert_eq!(
            sorted,
            vec!["src/a.java", "src/B.fxml", "src/b.fxml", "src/Zoo.java"]
        );
    }
}
