//! Markdown analysis for example documents.
//!
//! Splits a narrative document into the pieces an example bundle is built
//! from: title and description, fenced snippet and command blocks with the
//! prose that annotates them, and outbound references.
//!
//! Everything here is pure text processing. Filesystem work (image copies,
//! bundle writes) lives in `mdexamples-core`.

mod heading;
mod references;
mod scanner;

use tracing::{debug, instrument};

use mdexamples_shared::{Dialect, ExtractedBlock, Reference};

pub use heading::{Heading, extract_heading};
pub use references::{extract_images, extract_links};
pub use scanner::{Block, clean_annotation, extract_blocks, scan};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Fence tags that select each dialect.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Tags of snippet fences (e.g. `python`).
    pub snippet_tags: Vec<String>,
    /// Tags of command fences (e.g. `bash`, `shell`).
    pub command_tags: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            snippet_tags: vec!["python".into()],
            command_tags: vec!["bash".into(), "shell".into()],
        }
    }
}

/// Result of analysing one document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// First top-level heading, if the document has one.
    pub title: Option<String>,
    /// Text under the title, trimmed. May be empty.
    pub description: String,
    /// Snippet fences in document order.
    pub code_blocks: Vec<ExtractedBlock>,
    /// Command fences in document order.
    pub command_blocks: Vec<ExtractedBlock>,
    /// `http(s)` links in document order.
    pub links: Vec<Reference>,
    /// Image references in document order, targets as written.
    pub images: Vec<Reference>,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Analyse a markdown document.
///
/// Each dialect is scanned independently over the full text, so a command
/// block's annotation may include snippet fences and vice versa.
#[instrument(skip_all, fields(len = text.len()))]
pub fn parse(text: &str, opts: &ParseOptions) -> ParsedDocument {
    let Heading { title, description } = extract_heading(text);

    let code_blocks = extract_blocks(text, &opts.snippet_tags, Dialect::Snippet);
    let command_blocks = extract_blocks(text, &opts.command_tags, Dialect::Command);

    let links = extract_links(text);
    let images = extract_images(text);

    debug!(
        has_title = title.is_some(),
        code_blocks = code_blocks.len(),
        command_blocks = command_blocks.len(),
        links = links.len(),
        images = images.len(),
        "document parsed"
    );

    ParsedDocument {
        title,
        description,
        code_blocks,
        command_blocks,
        links,
        images,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const GUIDE: &str = r#"# Working with Enums

Use enumerated types for consistent extractions.

## Installation

Install the package first:

```bash
pip install instructor
```

## Defining the model

Start with the imports.

```python
from enum import Enum
```

Then declare the model. See [the docs](https://python.useinstructor.com/concepts/enums/).

```python
class Color(Enum):
    RED = "red"
```

![Flow](./img/flow.png)

Run it:

```shell
$ python enums.py
```
"#;

    #[test]
    fn parse_full_document() {
        let doc = parse(GUIDE, &ParseOptions::default());

        assert_eq!(doc.title.as_deref(), Some("Working with Enums"));
        assert_eq!(
            doc.description,
            "Use enumerated types for consistent extractions."
        );

        assert_eq!(doc.code_blocks.len(), 2);
        assert_eq!(doc.code_blocks[0].code, "from enum import Enum\n");
        assert_eq!(doc.code_blocks[1].preceding_annotation, "Then declare the model. See [the docs](https://python.useinstructor.com/concepts/enums/).");
        assert!(doc.code_blocks.iter().all(|b| b.dialect == Dialect::Snippet));

        assert_eq!(doc.command_blocks.len(), 2);
        assert_eq!(doc.command_blocks[0].preceding_annotation.lines().last(), Some("Install the package first:"));
        assert!(doc.command_blocks[1].preceding_annotation.ends_with("Run it:"));

        assert_eq!(doc.links.len(), 1);
        assert_eq!(doc.images.len(), 1);
        assert_eq!(doc.images[0].target, "./img/flow.png");
    }

    #[test]
    fn first_annotation_includes_description() {
        let doc = parse(GUIDE, &ParseOptions::default());
        let first = &doc.code_blocks[0].preceding_annotation;
        assert!(first.starts_with("Use enumerated types"));
        assert!(first.contains("pip install instructor"));
        assert!(first.ends_with("Start with the imports."));
        assert!(!first.contains("## "));
    }

    #[test]
    fn custom_tags() {
        let text = "# T\n\n```rust\nfn main() {}\n```\n\n```console\ncargo run\n```\n";
        let opts = ParseOptions {
            snippet_tags: vec!["rust".into()],
            command_tags: vec!["console".into()],
        };
        let doc = parse(text, &opts);
        assert_eq!(doc.code_blocks.len(), 1);
        assert_eq!(doc.command_blocks.len(), 1);
        assert_eq!(doc.command_blocks[0].code, "cargo run\n");
    }

    #[test]
    fn empty_document() {
        let doc = parse("", &ParseOptions::default());
        assert!(doc.title.is_none());
        assert!(doc.description.is_empty());
        assert!(doc.code_blocks.is_empty());
        assert!(doc.command_blocks.is_empty());
        assert!(doc.links.is_empty());
    }
}
