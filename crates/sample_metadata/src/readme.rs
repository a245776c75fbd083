//! README field extraction.
//!
//! A sample README is a head block (title, description, screenshot) followed by sections that
//! start with exactly two heading markers (`## Relevant API`, `## Tags`, ...). Deeper headings
//! stay inside the body of the enclosing section. Nothing else about Markdown is understood
//! here, and a document that does not follow this layout is a [`ParseError`].

use crate::error::{MetadataResult, ParseError};
use crate::vocabulary::contains_special_characters;
use regex::Regex;
use std::sync::LazyLock;

/// Section holding the relevant API list.
pub const RELEVANT_API_SECTION: &str = "Relevant API";

/// Section holding the comma-delimited tags.
pub const TAGS_SECTION: &str = "Tags";

static SECTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s(.*)").expect("section heading pattern"));

static API_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" \(.*\)").expect("api annotation pattern"));

static IMAGE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[.*\]\((.*)\)").expect("image reference pattern"));

/// Fields taken from a README.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadmeFields {
    pub title: String,
    pub description: String,
    pub relevant_apis: Vec<String>,
    pub keywords: Vec<String>,
    pub image: String,
}

impl ReadmeFields {
    /// Whether the title or description carries characters the site strips.
    pub fn has_special_characters(&self) -> bool {
        contains_special_characters(&self.title) || contains_special_characters(&self.description)
    }
}

/// One `## ` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Section<'a> {
    pub name: &'a str,
    pub body: &'a str,
}

/// A README split at its second-level headings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadmeSections<'a> {
    /// Everything before the first `## ` heading.
    pub head: &'a str,
    pub sections: Vec<Section<'a>>,
}

impl<'a> ReadmeSections<'a> {
    /// Body of the first section whose name matches exactly.
    pub fn section(&self, name: &str) -> Option<&'a str> {
        self.sections
            .iter()
            .find(|section| section.name == name)
            .map(|section| section.body)
    }

    fn required(&self, name: &'static str) -> MetadataResult<&'a str> {
        self.section(name)
            .ok_or_else(|| ParseError::MissingSection(name).into())
    }
}

/// Split README text into its head block and `## ` sections.
pub fn split_sections(text: &str) -> ReadmeSections<'_> {
    let headings: Vec<_> = SECTION_HEADING.captures_iter(text).collect();
    let head_end = headings
        .first()
        .and_then(|caps| caps.get(0))
        .map_or(text.len(), |m| m.start());

    let mut sections = Vec::with_capacity(headings.len());
    for (idx, caps) in headings.iter().enumerate() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_end = headings
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        sections.push(Section {
            name: name.as_str(),
            body: &text[whole.end()..body_end],
        });
    }

    ReadmeSections {
        head: &text[..head_end],
        sections,
    }
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.trim().is_empty())
}

/// Parse the head block into `(title, description)`.
///
/// The head must hold at least three non-blank lines: title, description and the screenshot
/// that follows them.
pub fn parse_head(head: &str) -> MetadataResult<(String, String)> {
    let lines: Vec<&str> = non_blank_lines(head).collect();
    if lines.len() < 3 {
        return Err(ParseError::ShortHead { found: lines.len() }.into());
    }
    let title = lines[0]
        .trim_start_matches(['#', ' '])
        .trim_end()
        .to_string();
    let description = lines[1].trim().to_string();
    Ok((title, description))
}

/// Parse the body of the relevant API section into a sorted list of API names.
///
/// List markers and a trailing parenthesized annotation are dropped, so `- Foo (bar)` becomes
/// `Foo`.
pub fn parse_apis(body: &str) -> MetadataResult<Vec<String>> {
    let mut apis: Vec<String> = non_blank_lines(body)
        .map(|line| {
            API_ANNOTATION
                .replace_all(line, "")
                .trim_start_matches(['*', '-', ' '])
                .to_string()
        })
        .collect();
    if apis.is_empty() {
        return Err(ParseError::EmptySection(RELEVANT_API_SECTION).into());
    }
    apis.sort();
    Ok(apis)
}

/// Parse the comma-delimited tags section into a sorted list.
///
/// Sorting is by codepoint, so uppercase tags come before lowercase ones.
pub fn parse_tags(body: &str) -> MetadataResult<Vec<String>> {
    let mut tags: Vec<String> = body
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect();
    if tags.is_empty() {
        return Err(ParseError::EmptySection(TAGS_SECTION).into());
    }
    tags.sort();
    Ok(tags)
}

/// Combine sorted tags and sorted APIs into the keyword list.
///
/// Tags that repeat an API name are dropped and the APIs are appended in their own order; the
/// result is not sorted again.
pub fn merge_keywords(tags: Vec<String>, apis: &[String]) -> Vec<String> {
    let mut keywords: Vec<String> = tags
        .into_iter()
        .filter(|tag| !apis.contains(tag))
        .collect();
    keywords.extend(apis.iter().cloned());
    keywords
}

/// Path of the first `![alt](path)` image reference.
pub fn extract_image(text: &str) -> MetadataResult<String> {
    let caps = IMAGE_REFERENCE
        .captures(text)
        .ok_or(ParseError::MissingImage)?;
    let path = caps.get(1).map_or("", |m| m.as_str());
    Ok(path.replace(')', ""))
}

/// Extract every README field.
pub fn extract(text: &str) -> MetadataResult<ReadmeFields> {
    let sections = split_sections(text);
    let apis_body = sections.required(RELEVANT_API_SECTION)?;
    let tags_body = sections.required(TAGS_SECTION)?;

    let (title, description) = parse_head(sections.head)?;
    let relevant_apis = parse_apis(apis_body)?;
    let tags = parse_tags(tags_body)?;
    let keywords = merge_keywords(tags, &relevant_apis);
    let image = extract_image(text)?;

    Ok(ReadmeFields {
        title,
        description,
        relevant_apis,
        keywords,
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;
    use pretty_assertions::assert_eq;

    const README: &str = "# Viewshed camera\n\
\n\
Analyze the viewshed for a camera.\n\
\n\
![Image of viewshed camera](ViewshedCamera.png)\n\
\n\
## Use case\n\
\n\
A viewshed shows the visible area.\n\
\n\
### Details\n\
\n\
Nested heading text.\n\
\n\
## Relevant API\n\
\n\
* ArcGISScene\n\
* LocationViewshed (deprecated alias)\n\
* Camera\n\
\n\
## Tags\n\
\n\
3D, Camera, viewshed, visibility analysis\n";

    #[test]
    fn split_sections_keeps_deeper_headings_in_body() {
        let sections = split_sections(README);
        let names: Vec<&str> = sections.sections.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Use case", "Relevant API", "Tags"]);
        assert!(sections.head.starts_with("# Viewshed camera"));
        assert!(sections
            .section("Use case")
            .is_some_and(|body| body.contains("### Details")));
    }

    #[test]
    fn split_sections_without_headings_is_all_head() {
        let sections = split_sections("# Title\ntext\n");
        assert_eq!(sections.head, "# Title\ntext\n");
        assert!(sections.sections.is_empty());
    }

    #[test]
    fn parse_head_ignores_leading_blank_lines() {
        let (title, description) =
            parse_head("\n\n## # Title  \n\n   A description.  \n![x](y.png)\n").expect("head");
        assert_eq!(title, "Title");
        assert_eq!(description, "A description.");
    }

    #[test]
    fn parse_head_requires_three_lines() {
        let err = parse_head("# Title\n\nDescription\n").expect_err("short head");
        assert_eq!(err, MetadataError::Parse(ParseError::ShortHead { found: 2 }));
    }

    #[test]
    fn parse_apis_strips_markers_and_annotations() {
        assert_eq!(
            parse_apis("- Foo (bar)\n- Baz\n").expect("apis"),
            vec!["Baz", "Foo"]
        );
        assert_eq!(
            parse_apis("\n* Map.getOperationalLayers (add layers)\n\n*-Basemap\n").expect("apis"),
            vec!["Basemap", "Map.getOperationalLayers"]
        );
    }

    #[test]
    fn parse_apis_rejects_empty_section() {
        let err = parse_apis("\n  \n").expect_err("empty");
        assert_eq!(
            err,
            MetadataError::Parse(ParseError::EmptySection(RELEVANT_API_SECTION))
        );
    }

    #[test]
    fn parse_tags_sorts_by_codepoint() {
        assert_eq!(parse_tags("B, a, C").expect("tags"), vec!["B", "C", "a"]);
        assert_eq!(
            parse_tags("\n\nsearch, Geocode , ,address\n").expect("tags"),
            vec!["Geocode", "address", "search"]
        );
    }

    #[test]
    fn parse_tags_rejects_empty_section() {
        assert!(parse_tags("\n , \n").is_err());
    }

    #[test]
    fn merge_keywords_drops_duplicate_apis_and_appends_them() {
        let tags = parse_tags("Foo, Bar").expect("tags");
        assert_eq!(merge_keywords(tags, &["Foo".to_string()]), vec!["Bar", "Foo"]);

        let tags = parse_tags("zoom, Map").expect("tags");
        let apis = vec!["ArcGISMap".to_string(), "MapView".to_string()];
        assert_eq!(
            merge_keywords(tags, &apis),
            vec!["Map", "zoom", "ArcGISMap", "MapView"]
        );
    }

    #[test]
    fn extract_image_returns_path_portion() {
        assert_eq!(
            extract_image("text\n![Screenshot](Screen Shot.png)\n").expect("image"),
            "Screen Shot.png"
        );
        assert_eq!(
            extract_image("![a](first.png)\n![b](second.png)\n").expect("image"),
            "first.png"
        );
        assert!(extract_image("no images here").is_err());
    }

    #[test]
    fn extract_collects_all_fields() {
        let fields = extract(README).expect("extract");
        assert_eq!(
            fields,
            ReadmeFields {
                title: "Viewshed camera".into(),
                description: "Analyze the viewshed for a camera.".into(),
                relevant_apis: vec![
                    "ArcGISScene".into(),
                    "Camera".into(),
                    "LocationViewshed".into()
                ],
                keywords: vec![
                    "3D".into(),
                    "viewshed".into(),
                    "visibility analysis".into(),
                    "ArcGISScene".into(),
                    "Camera".into(),
                    "LocationViewshed".into(),
                ],
                image: "ViewshedCamera.png".into(),
            }
        );
    }

    #[test]
    fn extract_requires_tags_section() {
        let text = README.replace("## Tags", "## Keywords");
        assert_eq!(
            extract(&text).expect_err("missing tags"),
            MetadataError::Parse(ParseError::MissingSection(TAGS_SECTION))
        );
    }
}
