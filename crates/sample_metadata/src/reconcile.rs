//! Reconciliation of derived metadata against the persisted `README.metadata.json`.

use crate::error::{MetadataError, MetadataResult};
use crate::paths;
use crate::readme::{self, ReadmeFields};
use crate::record::{canonical_json, MetadataRecord, MetadataRecordBuilder};
use crate::vocabulary::{strip_special_characters, METADATA_FILE, README_FILE};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// A loaded `README.metadata.json`.
#[derive(Clone, Debug, PartialEq)]
pub struct PersistedMetadata {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl PersistedMetadata {
    /// Load and parse the metadata file at `path`.
    ///
    /// A missing file, invalid JSON, or a root that is not an object is a read error.
    pub fn load(path: &Path) -> MetadataResult<Self> {
        let text = fs::read_to_string(path).map_err(|err| MetadataError::read(path, err))?;
        Self::parse(path, &text)
    }

    /// Parse metadata text attributed to `path`.
    pub fn parse(path: &Path, text: &str) -> MetadataResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| MetadataError::read(path, err))?;
        let Value::Object(fields) = value else {
            return Err(MetadataError::read(path, "metadata root must be a JSON object"));
        };
        Ok(Self {
            path: path.to_path_buf(),
            fields,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole record as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.get("description").and_then(Value::as_str)
    }

    /// Persisted snippets, if present as a list of strings.
    pub fn snippets(&self) -> Option<Vec<String>> {
        string_list(self.fields.get("snippets")?)
    }

    /// The `redirect_from` list, exactly as persisted.
    ///
    /// The field must be a list of strings. A list holding a single empty string is rejected
    /// because it breaks the site build.
    pub fn redirect_from(&self) -> MetadataResult<Vec<String>> {
        let Some(raw) = self.fields.get("redirect_from") else {
            return Err(MetadataError::read(&self.path, "missing `redirect_from`"));
        };
        let Some(list) = string_list(raw) else {
            return Err(MetadataError::read(
                &self.path,
                "`redirect_from` must be a list of strings",
            ));
        };
        if list.len() == 1 && list[0].is_empty() {
            return Err(MetadataError::validation(r#"redirect_from cannot be [""]"#));
        }
        Ok(list)
    }

    /// The `redirect_from` list in repaired form, for regeneration.
    ///
    /// A bare string becomes a one-element list, `[""]` and missing or malformed values become
    /// an empty list.
    pub fn redirect_from_repaired(&self) -> Vec<String> {
        let list = match self.fields.get("redirect_from") {
            Some(Value::String(single)) => vec![single.clone()],
            Some(other) => string_list(other).unwrap_or_default(),
            None => Vec::new(),
        };
        if list.len() == 1 && list[0].is_empty() {
            Vec::new()
        } else {
            list
        }
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(ToString::to_string))
        .collect()
}

/// Read and extract the README of `sample`.
pub fn read_readme(sample: &Path) -> MetadataResult<ReadmeFields> {
    let path = sample.join(README_FILE);
    let text = fs::read_to_string(&path).map_err(|err| MetadataError::read(&path, err))?;
    readme::extract(&text)
}

/// Adopt the persisted description when it is the derived one minus special characters.
pub fn apply_description_leniency(derived: &mut MetadataRecord, persisted: &PersistedMetadata) {
    let Some(description) = persisted.description() else {
        return;
    };
    if description != derived.description
        && description == strip_special_characters(&derived.description)
    {
        derived.description = description.to_string();
    }
}

/// Adopt the persisted snippet order when sorting it by codepoint gives the derived list.
///
/// The derived list is sorted case-insensitively, so this forgives only tie-break differences
/// between names that compare equal ignoring case. Any other ordering is left to the comparison.
pub fn apply_snippet_leniency(derived: &mut MetadataRecord, persisted: &PersistedMetadata) {
    let Some(persisted_snippets) = persisted.snippets() else {
        return;
    };
    let mut sorted = persisted_snippets.clone();
    sorted.sort();
    if sorted == derived.snippets {
        derived.snippets = persisted_snippets;
    }
}

/// Top-level fields whose values differ between the two records.
pub fn differing_fields(derived: &Value, persisted: &Value) -> Vec<String> {
    let empty = Map::new();
    let ours = derived.as_object().unwrap_or(&empty);
    let theirs = persisted.as_object().unwrap_or(&empty);
    let keys: BTreeSet<&String> = ours.keys().chain(theirs.keys()).collect();
    keys.into_iter()
        .filter(|key| ours.get(*key) != theirs.get(*key))
        .cloned()
        .collect()
}

fn compare(
    sample: &Path,
    derived: &MetadataRecord,
    persisted: &PersistedMetadata,
) -> MetadataResult<()> {
    let derived_value = derived.to_value()?;
    let persisted_value = persisted.to_value();
    if canonical_json(&derived_value)? == canonical_json(&persisted_value)? {
        return Ok(());
    }
    Err(MetadataError::Consistency {
        sample: sample.to_path_buf(),
        fields: differing_fields(&derived_value, &persisted_value),
    })
}

fn derive_record(
    sample: &Path,
    readme: ReadmeFields,
    redirect_from: Vec<String>,
) -> MetadataResult<MetadataRecord> {
    MetadataRecordBuilder::new()
        .readme(readme)
        .paths(paths::derive(sample)?)
        .redirect_from(redirect_from)
        .build()
}

/// Check that the persisted metadata of `sample` matches its README and source tree.
///
/// Returns the reconciled record on success.
pub fn check_sample(sample: &Path) -> MetadataResult<MetadataRecord> {
    let readme = read_readme(sample)?;
    let path_fields = paths::derive(sample)?;
    let persisted = PersistedMetadata::load(&sample.join(METADATA_FILE))?;
    let redirect_from = persisted.redirect_from()?;

    let mut derived = MetadataRecordBuilder::new()
        .readme(readme)
        .paths(path_fields)
        .redirect_from(redirect_from)
        .build()?;
    apply_description_leniency(&mut derived, &persisted);
    apply_snippet_leniency(&mut derived, &persisted);
    compare(sample, &derived, &persisted)?;
    Ok(derived)
}

/// Build the record that `README.metadata.json` of `sample` should hold.
///
/// `redirect_from` is carried over from the existing file in repaired form, and both leniency
/// rules apply so a sample that already passes [`check_sample`] regenerates unchanged.
pub fn regenerate(sample: &Path) -> MetadataResult<MetadataRecord> {
    let persisted = PersistedMetadata::load(&sample.join(METADATA_FILE))?;
    let mut record = derive_record(
        sample,
        read_readme(sample)?,
        persisted.redirect_from_repaired(),
    )?;
    apply_description_leniency(&mut record, &persisted);
    apply_snippet_leniency(&mut record, &persisted);
    Ok(record)
}
