use crate::runtime::config::ConfigLoader;
use crate::runtime::context::CommandContext;
use crate::runtime::error::{XtaskError, XtaskResult};
use sample_metadata::vocabulary::IGNORED_FOLDERS;
use serde::Deserialize;

pub(super) const SAMPLES_CONFIG_FILE: &str = "tools/samples/checks.toml";

/// `tools/samples/checks.toml`. Every key is optional.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(super) struct SamplesConfig {
    pub(super) markdown_lint: MarkdownLintConfig,
    pub(super) walk: WalkConfig,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(super) struct MarkdownLintConfig {
    pub(super) enabled: bool,
    pub(super) program: String,
    pub(super) style: String,
}

impl Default for MarkdownLintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "mdl".into(),
            style: "/style.rb".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(super) struct WalkConfig {
    pub(super) ignored_folders: Vec<String>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            ignored_folders: IGNORED_FOLDERS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl WalkConfig {
    pub(super) fn is_ignored(&self, folder: &str) -> bool {
        self.ignored_folders.iter().any(|ignored| ignored == folder)
    }
}

pub(super) fn load_samples_config(ctx: &CommandContext) -> XtaskResult<SamplesConfig> {
    let loader = ConfigLoader::<SamplesConfig>::new(ctx.root(), SAMPLES_CONFIG_FILE);
    let config = loader.load_or_default()?;
    validate_samples_config(&config).map_err(|err| err.with_path(loader.path()))?;
    Ok(config)
}

fn validate_samples_config(config: &SamplesConfig) -> XtaskResult<()> {
    let lint = &config.markdown_lint;
    if lint.enabled && lint.program.trim().is_empty() {
        return Err(XtaskError::config(
            "`markdown_lint.program` must name a program when the linter is enabled",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::error::XtaskErrorCategory;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let parsed: SamplesConfig =
            toml::from_str("[markdown_lint]\nstyle = \"tools/mdl-style.rb\"\n").expect("parse");
        assert_eq!(parsed.markdown_lint.program, "mdl");
        assert_eq!(parsed.markdown_lint.style, "tools/mdl-style.rb");
        assert!(parsed.markdown_lint.enabled);
        assert!(parsed.walk.is_ignored(".gradle"));
        assert!(!parsed.walk.is_ignored("map"));
    }

    #[test]
    fn ignored_folders_can_be_replaced() {
        let parsed: SamplesConfig =
            toml::from_str("[walk]\nignored_folders = [\"docs\"]\n").expect("parse");
        assert_eq!(parsed.walk.ignored_folders, vec!["docs".to_string()]);
        assert!(!parsed.walk.is_ignored(".git"));
    }

    #[test]
    fn enabled_linter_needs_a_program() {
        let parsed: SamplesConfig =
            toml::from_str("[markdown_lint]\nprogram = \" \"\n").expect("parse");
        let err = validate_samples_config(&parsed).expect_err("blank program");
        assert_eq!(err.category, XtaskErrorCategory::Config);

        let disabled: SamplesConfig =
            toml::from_str("[markdown_lint]\nenabled = false\nprogram = \"\"\n").expect("parse");
        assert!(validate_samples_config(&disabled).is_ok());
    }
}
