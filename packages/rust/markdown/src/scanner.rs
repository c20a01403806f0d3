//! Fence scanning and annotation extraction.
//!
//! A document is scanned once per dialect. Each scan splits the text into an
//! alternating sequence of [`Block::Prose`] and [`Block::Code`], where only
//! fences tagged with one of the dialect's tags become code. Fences with any
//! other tag are still tracked (so their bodies never open or close a match)
//! but stay inside the surrounding prose.

use std::sync::LazyLock;

use regex::Regex;

use mdexamples_shared::{Dialect, ExtractedBlock};

/// One region of a document as seen by a single-dialect scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block<'a> {
    /// A fenced region whose tag belongs to the scanned dialect.
    Code {
        tag: &'a str,
        text: &'a str,
        start: usize,
        end: usize,
    },
    /// Everything between two code blocks (or the document edges).
    Prose {
        text: &'a str,
        start: usize,
        end: usize,
    },
}

/// An opening fence line: backtick count and the first word of the info string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FenceOpen<'a> {
    pub ticks: usize,
    pub tag: &'a str,
}

struct OpenFence<'a> {
    ticks: usize,
    tag: &'a str,
    matched: bool,
    start: usize,
    body_start: usize,
}

/// Parse an opening fence line, if `line` is one.
pub(crate) fn fence_open(line: &str) -> Option<FenceOpen<'_>> {
    let trimmed = line.trim_start();
    let ticks = trimmed.bytes().take_while(|b| *b == b'`').count();
    if ticks < 3 {
        return None;
    }
    let info = trimmed[ticks..].trim();
    // Backticks in the info string mean inline code, not a fence.
    if info.contains('`') {
        return None;
    }
    Some(FenceOpen {
        ticks,
        tag: info.split_whitespace().next().unwrap_or(""),
    })
}

/// Whether `line` closes a fence opened with `ticks` backticks.
pub(crate) fn is_fence_close(line: &str, ticks: usize) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= ticks && trimmed.bytes().all(|b| b == b'`')
}

/// Split `text` into prose and code blocks for the given fence tags.
///
/// Blocks come out in document order with strictly increasing offsets.
/// A fence of the scanned dialect that is never closed runs to the end
/// of the document.
pub fn scan<'a>(text: &'a str, tags: &[String]) -> Vec<Block<'a>> {
    let mut blocks = Vec::new();
    let mut prose_start = 0;
    let mut offset = 0;
    let mut open: Option<OpenFence<'a>> = None;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        match open.take() {
            None => {
                if let Some(fence) = fence_open(line) {
                    open = Some(OpenFence {
                        ticks: fence.ticks,
                        tag: fence.tag,
                        matched: tags.iter().any(|t| t == fence.tag),
                        start: line_start,
                        body_start: offset,
                    });
                }
            }
            Some(fence) => {
                if !is_fence_close(line, fence.ticks) {
                    open = Some(fence);
                    continue;
                }
                if fence.matched {
                    let end = line_start + line.trim_end_matches(['\n', '\r']).len();
                    push_prose(&mut blocks, text, prose_start, fence.start);
                    blocks.push(Block::Code {
                        tag: fence.tag,
                        text: &text[fence.body_start..line_start],
                        start: fence.start,
                        end,
                    });
                    prose_start = end;
                }
            }
        }
    }

    if let Some(fence) = open {
        if fence.matched {
            tracing::debug!(
                tag = fence.tag,
                start = fence.start,
                "unterminated fence runs to end of document"
            );
            push_prose(&mut blocks, text, prose_start, fence.start);
            blocks.push(Block::Code {
                tag: fence.tag,
                text: &text[fence.body_start..],
                start: fence.start,
                end: text.len(),
            });
            prose_start = text.len();
        }
    }

    push_prose(&mut blocks, text, prose_start, text.len());
    blocks
}

fn push_prose<'a>(blocks: &mut Vec<Block<'a>>, text: &'a str, start: usize, end: usize) {
    if start < end {
        blocks.push(Block::Prose {
            text: &text[start..end],
            start,
            end,
        });
    }
}

/// Lines outside any fenced region, with their byte offsets.
///
/// Fence delimiter lines themselves are excluded.
pub(crate) fn prose_lines(text: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut offset = 0;
    let mut open_ticks: Option<usize> = None;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        match open_ticks {
            Some(ticks) => {
                if is_fence_close(line, ticks) {
                    open_ticks = None;
                }
            }
            None => match fence_open(line) {
                Some(fence) => open_ticks = Some(fence.ticks),
                None => lines.push((line_start, line.trim_end_matches(['\n', '\r']))),
            },
        }
    }

    lines
}

/// Whether a line is a markdown ATX heading (`#`…`#` followed by whitespace).
pub(crate) fn is_heading_line(line: &str) -> bool {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    hashes > 0 && matches!(line.as_bytes().get(hashes), Some(b' ' | b'\t'))
}

/// Strip heading lines from prose and trim the result.
///
/// Heading lines are blanked rather than spliced out, so the paragraph
/// spacing around them survives in the re-emitted comments.
pub fn clean_annotation(prose: &str) -> String {
    static HEADING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^#+[ \t].*$").expect("valid regex"));

    HEADING_RE.replace_all(prose, "").trim().to_string()
}

/// Extract every block of one dialect with its preceding annotation.
///
/// The annotation of each block is the prose since the previous block of
/// the *same* dialect; other dialects never move this cursor.
pub fn extract_blocks(text: &str, tags: &[String], dialect: Dialect) -> Vec<ExtractedBlock> {
    let mut extracted = Vec::new();
    let mut pending: &str = "";

    for block in scan(text, tags) {
        match block {
            Block::Prose { text, .. } => pending = text,
            Block::Code {
                text: code,
                start,
                end,
                ..
            } => {
                extracted.push(ExtractedBlock {
                    dialect,
                    code: code.to_string(),
                    preceding_annotation: clean_annotation(pending),
                    source_offset_start: start,
                    source_offset_end: end,
                });
                pending = "";
            }
        }
    }

    extracted
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fence_open_reads_tag() {
        assert_eq!(
            fence_open("```python\n"),
            Some(FenceOpen {
                ticks: 3,
                tag: "python"
            })
        );
        assert_eq!(fence_open("  ````bash title=x").map(|f| f.tag), Some("bash"));
        assert_eq!(fence_open("```").map(|f| f.tag), Some(""));
        assert_eq!(fence_open("``not a fence"), None);
        assert_eq!(fence_open("```inline``` code"), None);
    }

    #[test]
    fn fence_close_needs_enough_ticks() {
        assert!(is_fence_close("```\n", 3));
        assert!(is_fence_close("  ````  ", 3));
        assert!(!is_fence_close("```", 4));
        assert!(!is_fence_close("```python", 3));
    }

    #[test]
    fn scan_alternates_prose_and_code() {
        let text = "Intro\n\n```python\nx = 1\n```\n\nOutro\n";
        let blocks = scan(text, &tags(&["python"]));
        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[0], Block::Prose { text: "Intro\n\n", .. }));
        match &blocks[1] {
            Block::Code {
                tag,
                text: code,
                start,
                end,
            } => {
                assert_eq!(*tag, "python");
                assert_eq!(*code, "x = 1\n");
                assert_eq!(*start, 7);
                assert_eq!(&text[*start..*end], "```python\nx = 1\n```");
            }
            other => panic!("expected code, got {other:?}"),
        }
        assert!(matches!(blocks[2], Block::Prose { text: "\n\nOutro\n", .. }));
    }

    #[test]
    fn foreign_fences_stay_in_prose() {
        let text = "A\n```bash\n# not a heading\n```python\n```\nB\n```python\ny\n```\n";
        let blocks = scan(text, &tags(&["python"]));
        let codes: Vec<_> = blocks
            .iter()
            .filter_map(|b| match b {
                Block::Code { text, .. } => Some(*text),
                _ => None,
            })
            .collect();
        // The `python` line inside the bash fence is body text, not an opener.
        assert_eq!(codes, vec!["y\n"]);
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let text = "Before\n```python\nprint(1)\n";
        let blocks = scan(text, &tags(&["python"]));
        match blocks.last() {
            Some(Block::Code { text: code, end, .. }) => {
                assert_eq!(*code, "print(1)\n");
                assert_eq!(*end, text.len());
            }
            other => panic!("expected trailing code, got {other:?}"),
        }
    }

    #[test]
    fn offsets_strictly_increase() {
        let text = "```python\na\n```\n```python\nb\n```\ntext\n```python\nc\n```";
        let blocks = extract_blocks(text, &tags(&["python"]), Dialect::Snippet);
        assert_eq!(blocks.len(), 3);
        for pair in blocks.windows(2) {
            assert!(pair[0].source_offset_end <= pair[1].source_offset_start);
            assert!(pair[0].source_offset_start < pair[1].source_offset_start);
        }
        assert_eq!(blocks[2].preceding_annotation, "text");
    }

    #[test]
    fn clean_annotation_strips_headings() {
        let prose = "\n## Step one\n\nDo the thing.\n### Detail\nMore.\n";
        assert_eq!(clean_annotation(prose), "Do the thing.\n\nMore.");
    }

    #[test]
    fn clean_annotation_keeps_hash_without_space() {
        assert_eq!(clean_annotation("#hashtag stays"), "#hashtag stays");
    }

    #[test]
    fn annotations_follow_same_dialect_cursor() {
        let text = "# Title\n\nDesc\n\nSetup text\n\n```python\ncode A\n```\n\nMore text\n\n```python\ncode B\n```\n";
        let blocks = extract_blocks(text, &tags(&["python"]), Dialect::Snippet);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].code, "code A\n");
        assert!(blocks[0].preceding_annotation.ends_with("Setup text"));
        assert_eq!(blocks[1].code, "code B\n");
        assert_eq!(blocks[1].preceding_annotation, "More text");
    }

    #[test]
    fn command_cursor_ignores_snippet_fences() {
        let text = "Install first\n\n```bash\npip install x\n```\n\nThen code\n\n```python\nimport x\n```\n\nNow run\n\n```shell\npython main.py\n```\n";
        let commands = extract_blocks(text, &tags(&["bash", "shell"]), Dialect::Command);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].preceding_annotation, "Install first");
        // The second command's annotation spans the python fence between them.
        let second = &commands[1].preceding_annotation;
        assert!(second.starts_with("Then code"));
        assert!(second.contains("import x"));
        assert!(second.ends_with("Now run"));

        let snippets = extract_blocks(text, &tags(&["python"]), Dialect::Snippet);
        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].preceding_annotation.contains("pip install x"));
    }

    #[test]
    fn prose_lines_skip_fenced_content() {
        let text = "# Title\n```python\n# comment\n```\n## Next\n";
        let lines: Vec<_> = prose_lines(text).into_iter().map(|(_, l)| l).collect();
        assert_eq!(lines, vec!["# Title", "## Next"]);
    }

    #[test]
    fn heading_line_detection() {
        assert!(is_heading_line("# Title"));
        assert!(is_heading_line("###\tDeep"));
        assert!(!is_heading_line("#!/bin/sh"));
        assert!(!is_heading_line("text # not heading"));
        assert!(!is_heading_line("#"));
    }
}
