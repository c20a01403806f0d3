//! Comment-structure checks for generated snippet files.
//!
//! A well-formed snippet starts with a `# Title` line, a blank line, and a
//! non-empty `# description` line.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use mdexamples_shared::{MdExamplesError, Result};

/// A structural problem in a snippet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintIssue {
    TooFewLines,
    MissingTitle,
    MissingBlankAfterTitle,
    /// `#` on line 3, blank line 4, description pushed to line 5.
    DescriptionOnLineFive,
    EmptyDescription,
    MissingDescription,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::TooFewLines => "too few lines, missing proper comment structure",
            Self::MissingTitle => "first line is not a title comment",
            Self::MissingBlankAfterTitle => "no blank line after title",
            Self::DescriptionOnLineFive => "incorrect format (description on line 5 instead of line 3)",
            Self::EmptyDescription => "missing description (line 3 just has '#')",
            Self::MissingDescription => "missing description after blank line",
        };
        f.write_str(msg)
    }
}

/// One finding from [`lint_bundles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    pub path: PathBuf,
    pub issue: LintIssue,
}

/// Check the header of one snippet file.
pub fn check_snippet(content: &str) -> Option<LintIssue> {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();

    if lines.len() < 3 {
        return Some(LintIssue::TooFewLines);
    }
    if !lines[0].starts_with("# ") {
        return Some(LintIssue::MissingTitle);
    }
    if !lines[1].is_empty() {
        return Some(LintIssue::MissingBlankAfterTitle);
    }
    if lines.len() >= 5
        && lines[2] == "#"
        && lines[3].is_empty()
        && lines[4].starts_with("# ")
        && lines[4].len() > 2
    {
        return Some(LintIssue::DescriptionOnLineFive);
    }
    if lines[2] == "#" {
        return Some(LintIssue::EmptyDescription);
    }
    if !lines[2].starts_with("# ") {
        return Some(LintIssue::MissingDescription);
    }
    None
}

/// Check every snippet file in every bundle directory under `output_dir`.
///
/// Hidden directories (in-progress staging) are ignored. Findings are
/// sorted by path.
#[instrument(skip_all, fields(dir = %output_dir.display()))]
pub fn lint_bundles(output_dir: &Path, snippet_extension: &str) -> Result<Vec<LintFinding>> {
    let mut findings = Vec::new();

    for bundle_dir in read_dir_sorted(output_dir)? {
        let hidden = bundle_dir
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if !bundle_dir.is_dir() || hidden {
            continue;
        }

        for path in read_dir_sorted(&bundle_dir)? {
            if path.extension().and_then(|e| e.to_str()) != Some(snippet_extension) {
                continue;
            }
            let content =
                std::fs::read_to_string(&path).map_err(|e| MdExamplesError::io(&path, e))?;
            if let Some(issue) = check_snippet(&content) {
                debug!(path = %path.display(), %issue, "snippet needs fixing");
                findings.push(LintFinding { path, issue });
            }
        }
    }

    Ok(findings)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = std::fs::read_dir(dir)
        .map_err(|e| MdExamplesError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| MdExamplesError::io(dir, e))?;
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::temp_dir;

    #[test]
    fn well_formed_snippet() {
        assert_eq!(check_snippet("# Title\n\n# A description.\nimport x\n"), None);
    }

    #[test]
    fn header_problems() {
        assert_eq!(check_snippet("# Title\n"), Some(LintIssue::TooFewLines));
        assert_eq!(check_snippet("Title\n\n# d\n"), Some(LintIssue::MissingTitle));
        assert_eq!(check_snippet("# Title\nx\n# d\n"), Some(LintIssue::MissingBlankAfterTitle));
        assert_eq!(check_snippet("# Title\n\nimport x\n"), Some(LintIssue::MissingDescription));
        assert_eq!(check_snippet("# Title\n\n# \n\nimport x\n"), Some(LintIssue::EmptyDescription));
        assert_eq!(
            check_snippet("# Title\n\n#\n\n# Late description\n"),
            Some(LintIssue::DescriptionOnLineFive)
        );
    }

    #[test]
    fn issue_messages() {
        assert_eq!(
            LintIssue::MissingBlankAfterTitle.to_string(),
            "no blank line after title"
        );
    }

    #[test]
    fn lint_walks_bundles() {
        let tmp = temp_dir("mdx-lint-test");
        std::fs::create_dir_all(tmp.join("001-good")).unwrap();
        std::fs::create_dir_all(tmp.join("002-bad")).unwrap();
        std::fs::create_dir_all(tmp.join(".003-staging.partial")).unwrap();
        std::fs::write(tmp.join("001-good/good.snippet"), "# Good\n\n# Desc\n").unwrap();
        std::fs::write(tmp.join("001-good/good.cmd"), "not checked").unwrap();
        std::fs::write(tmp.join("002-bad/bad.snippet"), "# Bad\n\n# \n\n").unwrap();
        std::fs::write(tmp.join(".003-staging.partial/s.snippet"), "x").unwrap();

        let findings = lint_bundles(&tmp, "snippet").unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].path.ends_with("002-bad/bad.snippet"));
        assert_eq!(findings[0].issue, LintIssue::EmptyDescription);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
