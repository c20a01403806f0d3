//! Core domain types for mdexamples bundles.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MdExamplesError, Result};

// ---------------------------------------------------------------------------
// ExampleId
// ---------------------------------------------------------------------------

/// Identifier of one example, taken from the source file stem (`007-anthropic`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExampleId(String);

impl ExampleId {
    /// Wrap a raw identifier. Empty identifiers are rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(MdExamplesError::validation("empty example identifier"));
        }
        Ok(Self(raw))
    }

    /// Derive the identifier from a document path's file stem.
    pub fn from_path(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                MdExamplesError::validation(format!(
                    "cannot derive example id from {}",
                    path.display()
                ))
            })?;
        Self::new(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name used for the generated files: the part after the first `-`,
    /// or the whole identifier when there is none.
    pub fn example_name(&self) -> &str {
        match self.0.split_once('-') {
            Some((_, rest)) => rest,
            None => &self.0,
        }
    }

    /// Title Case rendering of the identifier, used when a document has no heading.
    pub fn fallback_title(&self) -> String {
        self.0
            .split(['-', '_'])
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for ExampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// SourceDocument
// ---------------------------------------------------------------------------

/// One narrative markdown file, read once per run.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub raw_text: String,
}

impl SourceDocument {
    /// Read a document from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let raw_text = std::fs::read_to_string(path).map_err(|e| MdExamplesError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            raw_text,
        })
    }

    /// Directory relative image references are resolved against.
    pub fn parent_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn id(&self) -> Result<ExampleId> {
        ExampleId::from_path(&self.path)
    }
}

// ---------------------------------------------------------------------------
// Blocks and references
// ---------------------------------------------------------------------------

/// Which kind of fenced region a block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Primary snippet code, re-emitted into the snippet file.
    Snippet,
    /// Command-line fences, re-emitted into the shell file.
    Command,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snippet => f.write_str("snippet"),
            Self::Command => f.write_str("command"),
        }
    }
}

/// A fenced region plus the prose that precedes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedBlock {
    pub dialect: Dialect,
    /// Fence body, newline-terminated.
    pub code: String,
    /// Prose since the previous block of the same dialect, headings removed.
    pub preceding_annotation: String,
    /// Byte offset of the opening fence line.
    pub source_offset_start: usize,
    /// Byte offset just past the closing fence.
    pub source_offset_end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Link,
    Image,
}

/// An outbound hyperlink or an image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl Reference {
    pub fn link(target: impl Into<String>) -> Self {
        Self {
            kind: ReferenceKind::Link,
            target: target.into(),
            alt_text: None,
        }
    }

    pub fn image(target: impl Into<String>, alt_text: impl Into<String>) -> Self {
        let alt_text = alt_text.into();
        Self {
            kind: ReferenceKind::Image,
            target: target.into(),
            alt_text: (!alt_text.is_empty()).then_some(alt_text),
        }
    }
}

// ---------------------------------------------------------------------------
// ExampleBundle
// ---------------------------------------------------------------------------

/// Everything derived from one source document, ready to be emitted.
#[derive(Debug, Clone, Serialize)]
pub struct ExampleBundle {
    pub id: ExampleId,
    pub title: String,
    pub description: String,
    pub code_blocks: Vec<ExtractedBlock>,
    pub command_blocks: Vec<ExtractedBlock>,
    pub references: Vec<Reference>,
}

impl ExampleBundle {
    /// Link targets in collected order (images excluded).
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.references
            .iter()
            .filter(|r| r.kind == ReferenceKind::Link)
            .map(|r| r.target.as_str())
    }

    /// Image references in collected order.
    pub fn images(&self) -> impl Iterator<Item = &Reference> {
        self.references
            .iter()
            .filter(|r| r.kind == ReferenceKind::Image)
    }
}

// ---------------------------------------------------------------------------
// SectionMap
// ---------------------------------------------------------------------------

/// Example id → section id, loaded once per run and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionMap(BTreeMap<String, String>);

impl SectionMap {
    pub fn insert(&mut self, example_id: impl Into<String>, section_id: impl Into<String>) {
        self.0.insert(example_id.into(), section_id.into());
    }

    pub fn section_for(&self, id: &ExampleId) -> Option<&str> {
        self.0.get(id.as_str()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_id_from_numbered_file() {
        let id = ExampleId::from_path(Path::new("docs/007-anthropic.md")).unwrap();
        assert_eq!(id.as_str(), "007-anthropic");
        assert_eq!(id.example_name(), "anthropic");
    }

    #[test]
    fn example_name_splits_on_first_separator_only() {
        let id = ExampleId::new("001-getting-started").unwrap();
        assert_eq!(id.example_name(), "getting-started");
    }

    #[test]
    fn example_name_without_separator_is_whole_id() {
        let id = ExampleId::new("resources").unwrap();
        assert_eq!(id.example_name(), "resources");
    }

    #[test]
    fn fallback_title_is_title_case() {
        let id = ExampleId::new("007-anthropic").unwrap();
        assert_eq!(id.fallback_title(), "007 Anthropic");

        let id = ExampleId::new("014-nested_STRUCTURES").unwrap();
        assert_eq!(id.fallback_title(), "014 Nested Structures");
    }

    #[test]
    fn empty_id_rejected() {
        assert!(ExampleId::new("  ").is_err());
    }

    #[test]
    fn image_reference_drops_empty_alt() {
        let r = Reference::image("logo.png", "");
        assert_eq!(r.alt_text, None);
        let r = Reference::image("logo.png", "Logo");
        assert_eq!(r.alt_text.as_deref(), Some("Logo"));
    }

    #[test]
    fn bundle_splits_links_and_images() {
        let bundle = ExampleBundle {
            id: ExampleId::new("001-x").unwrap(),
            title: "X".into(),
            description: String::new(),
            code_blocks: vec![],
            command_blocks: vec![],
            references: vec![
                Reference::link("https://a.example"),
                Reference::image("logo.png", "logo"),
                Reference::link("https://a.example"),
            ],
        };
        let links: Vec<_> = bundle.links().collect();
        assert_eq!(links, vec!["https://a.example", "https://a.example"]);
        assert_eq!(bundle.images().count(), 1);
    }

    #[test]
    fn section_map_lookup() {
        let mut map = SectionMap::default();
        map.insert("001-getting-started", "basics");
        let id = ExampleId::new("001-getting-started").unwrap();
        assert_eq!(map.section_for(&id), Some("basics"));
        assert_eq!(map.len(), 1);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"001-getting-started":"basics"}"#);
    }
}
