//! The `README.metadata.json` record and its canonical text form.

use crate::error::{MetadataError, MetadataResult};
use crate::paths::{is_excluded, PathFields};
use crate::readme::ReadmeFields;
use crate::vocabulary::{Category, SOURCE_EXTENSIONS};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::fs;
use std::path::Path;

/// A complete sample metadata record.
///
/// Records are only produced by [`MetadataRecordBuilder::build`], which checks the record
/// invariants before handing one out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub(crate) category: String,
    pub(crate) description: String,
    pub(crate) ignore: bool,
    pub(crate) images: Vec<String>,
    pub(crate) keywords: Vec<String>,
    pub(crate) redirect_from: Vec<String>,
    pub(crate) relevant_apis: Vec<String>,
    pub(crate) snippets: Vec<String>,
    pub(crate) title: String,
}

impl MetadataRecord {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn ignore(&self) -> bool {
        self.ignore
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn redirect_from(&self) -> &[String] {
        &self.redirect_from
    }

    pub fn relevant_apis(&self) -> &[String] {
        &self.relevant_apis
    }

    pub fn snippets(&self) -> &[String] {
        &self.snippets
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// JSON object form with keys in sorted order.
    pub fn to_value(&self) -> MetadataResult<Value> {
        serde_json::to_value(self)
            .map_err(|err| MetadataError::validation(format!("failed to serialize record: {err}")))
    }

    /// Canonical text form used for comparison.
    pub fn to_canonical_json(&self) -> MetadataResult<String> {
        canonical_json(&self.to_value()?)
    }

    /// Write the canonical form plus a trailing newline to `path`.
    pub fn write_to(&self, path: &Path) -> MetadataResult<()> {
        let body = self.to_canonical_json()?;
        fs::write(path, format!("{body}\n")).map_err(|err| MetadataError::read(path, err))
    }
}

/// Render a JSON value with sorted object keys and four-space indentation.
pub fn canonical_json(value: &Value) -> MetadataResult<String> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    sort_keys(value)
        .serialize(&mut serializer)
        .map_err(|err| MetadataError::validation(format!("failed to serialize record: {err}")))?;
    String::from_utf8(out)
        .map_err(|err| MetadataError::validation(format!("record is not valid UTF-8: {err}")))
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Fail-closed builder for [`MetadataRecord`].
#[derive(Clone, Debug, Default)]
pub struct MetadataRecordBuilder {
    category: Option<Category>,
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    relevant_apis: Option<Vec<String>>,
    keywords: Option<Vec<String>>,
    snippets: Option<Vec<String>>,
    redirect_from: Option<Vec<String>>,
}

impl MetadataRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take title, description, image, APIs and keywords from README fields.
    pub fn readme(mut self, fields: ReadmeFields) -> Self {
        self.title = Some(fields.title);
        self.description = Some(fields.description);
        self.image = Some(fields.image);
        self.relevant_apis = Some(fields.relevant_apis);
        self.keywords = Some(fields.keywords);
        self
    }

    /// Take category and snippets from path fields.
    pub fn paths(mut self, fields: PathFields) -> Self {
        self.category = Some(fields.category);
        self.snippets = Some(fields.snippets);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn snippets(mut self, snippets: Vec<String>) -> Self {
        self.snippets = Some(snippets);
        self
    }

    pub fn redirect_from(mut self, redirect_from: Vec<String>) -> Self {
        self.redirect_from = Some(redirect_from);
        self
    }

    /// Produce the record, or the first missing field or broken invariant.
    pub fn build(self) -> MetadataResult<MetadataRecord> {
        let category = require(self.category, "category")?;
        let title = require(self.title, "title")?;
        let description = require(self.description, "description")?;
        let image = require(self.image, "images")?;
        let relevant_apis = require(self.relevant_apis, "relevant_apis")?;
        let keywords = require(self.keywords, "keywords")?;
        let snippets = require(self.snippets, "snippets")?;
        let redirect_from = require(self.redirect_from, "redirect_from")?;

        if !keywords.ends_with(&relevant_apis) {
            return Err(MetadataError::validation(
                "keywords must end with the relevant APIs",
            ));
        }
        validate_snippets(&snippets)?;

        Ok(MetadataRecord {
            category: category.display_name().to_string(),
            description,
            ignore: false,
            images: vec![image],
            keywords,
            redirect_from,
            relevant_apis,
            snippets,
            title,
        })
    }
}

fn require<T>(value: Option<T>, field: &str) -> MetadataResult<T> {
    value.ok_or_else(|| MetadataError::validation(format!("metadata record is missing `{field}`")))
}

fn validate_snippets(snippets: &[String]) -> MetadataResult<()> {
    if snippets.is_empty() {
        return Err(MetadataError::validation("snippets must not be empty"));
    }
    for snippet in snippets {
        let recognized = SOURCE_EXTENSIONS
            .iter()
            .any(|ext| snippet.ends_with(&format!(".{ext}")));
        if !recognized || is_excluded(snippet) {
            return Err(MetadataError::validation(format!(
                "snippet `{snippet}` is not a recognized source file"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn readme_fields() -> ReadmeFields {
        ReadmeFields {
            title: "Display map".into(),
            description: "Display a map.".into(),
            relevant_apis: vec!["ArcGISMap".into(), "MapView".into()],
            keywords: vec!["basemap".into(), "ArcGISMap".into(), "MapView".into()],
            image: "DisplayMap.png".into(),
        }
    }

    fn path_fields() -> PathFields {
        PathFields {
            category: Category::MapView,
            snippets: vec!["DisplayMapSample.java".into()],
        }
    }

    #[test]
    fn build_fails_closed_until_all_fields_are_set() {
        let err = MetadataRecordBuilder::new()
            .readme(readme_fields())
            .paths(path_fields())
            .build()
            .expect_err("redirect_from unset");
        assert!(err.to_string().contains("`redirect_from`"));

        let err = MetadataRecordBuilder::new()
            .readme(readme_fields())
            .redirect_from(Vec::new())
            .build()
            .expect_err("paths unset");
        assert!(err.to_string().contains("`category`"));
    }

    #[test]
    fn build_rejects_excluded_snippets() {
        let err = MetadataRecordBuilder::new()
            .readme(readme_fields())
            .paths(path_fields())
            .snippets(vec!["build/Generated.java".into()])
            .redirect_from(Vec::new())
            .build()
            .expect_err("excluded snippet");
        assert!(err.to_string().contains("build/Generated.java"));
    }

    #[test]
    fn canonical_json_sorts_keys_with_four_space_indent() {
        let record = MetadataRecordBuilder::new()
            .readme(readme_fields())
            .paths(path_fields())
            .redirect_from(Vec::new())
            .build()
            .expect("record");
        let expected = r#"{
    "category": "Map view",
    "description": "Display a map.",
    "ignore": false,
    "images": [
        "DisplayMap.png"
    ],
    "keywords": [
        "basemap",
        "ArcGISMap",
        "MapView"
    ],
    "redirect_from": [],
    "relevant_apis": [
        "ArcGISMap",
        "MapView"
    ],
    "snippets": [
        "DisplayMapSample.java"
    ],
    "title": "Display map"
}"#;
        assert_eq!(record.to_canonical_json().expect("json"), expected);
    }

    #[test]
    fn canonical_json_orders_keys_of_arbitrary_values() {
        let value: Value = serde_json::from_str(r#"{"b": 1, "a": {"d": true, "c": null}}"#)
            .expect("parse");
        assert_eq!(
            canonical_json(&value).expect("json"),
            "{\n    \"a\": {\n        \"c\": null,\n        \"d\": true\n    },\n    \"b\": 1\n}"
        );
    }
}
