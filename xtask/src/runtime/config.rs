//! Typed configuration loading helpers.

use crate::runtime::error::{XtaskError, XtaskResult};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Generic TOML-backed config loader.
///
/// `ConfigLoader<T>` handles only filesystem access and TOML deserialization. Command domains
/// validate the typed value themselves.
///
/// ```rust
/// # use serde::Deserialize;
/// # use std::path::Path;
/// # use xtask::runtime::config::ConfigLoader;
/// #[derive(Default, Deserialize)]
/// struct LintConfig {
///     enabled: bool,
/// }
///
/// let loader = ConfigLoader::<LintConfig>::new(Path::new("/workspace"), "tools/lint.toml");
/// assert!(loader.path().ends_with("tools/lint.toml"));
/// ```
#[derive(Clone, Debug)]
pub struct ConfigLoader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> ConfigLoader<T>
where
    T: DeserializeOwned,
{
    /// Create a loader for the given workspace-relative path.
    pub fn new(root: &Path, relative_path: &str) -> Self {
        Self {
            path: root.join(relative_path),
            _marker: PhantomData,
        }
    }

    /// Load and deserialize the configuration file.
    ///
    /// Missing files, unreadable files, and TOML parse failures are all surfaced as
    /// [`XtaskErrorCategory::Config`](crate::runtime::error::XtaskErrorCategory::Config).
    pub fn load(&self) -> XtaskResult<T> {
        let body = fs::read_to_string(&self.path).map_err(|err| {
            XtaskError::config(format!("failed to read {}: {err}", self.path.display()))
        })?;
        self.parse(&body)
    }

    /// Return the config path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, body: &str) -> XtaskResult<T> {
        toml::from_str(body).map_err(|err| {
            XtaskError::config(format!("failed to parse {}: {err}", self.path.display()))
                .with_hint("compare with the keys documented in the file header")
        })
    }
}

impl<T> ConfigLoader<T>
where
    T: DeserializeOwned + Default,
{
    /// Load the configuration file, or the default value when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(&self) -> XtaskResult<T> {
        match fs::read_to_string(&self.path) {
            Ok(body) => self.parse(&body),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(err) => Err(XtaskError::config(format!(
                "failed to read {}: {err}",
                self.path.display()
            ))),
        }
    }
}
