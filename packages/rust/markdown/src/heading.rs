//! Title and description extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::scanner::{is_heading_line, prose_lines};

/// Title and description of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Text of the first top-level heading, if any.
    pub title: Option<String>,
    /// Text between the title and the next heading. Empty when absent.
    pub description: String,
}

/// Find the first `# ` heading outside fenced code and the description below it.
///
/// The description runs from the line after the title to the next heading
/// of any level, or the end of the document.
pub fn extract_heading(text: &str) -> Heading {
    static H1_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^# (.+)$").expect("valid regex"));

    let lines = prose_lines(text);

    let Some((idx, title)) = lines.iter().enumerate().find_map(|(i, (_, line))| {
        H1_RE
            .captures(line)
            .map(|c| (i, c[1].trim().to_string()))
            .filter(|(_, t)| !t.is_empty())
    }) else {
        return Heading {
            title: None,
            description: String::new(),
        };
    };

    let (title_offset, title_line) = lines[idx];
    let body_start = (title_offset + title_line.len()).min(text.len());
    let body_end = lines[idx + 1..]
        .iter()
        .find(|(_, line)| is_heading_line(line))
        .map(|(offset, _)| *offset)
        .unwrap_or(text.len());

    Heading {
        title: Some(title),
        description: text[body_start..body_end].trim().to_string(),
    }
}
