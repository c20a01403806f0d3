//! Example emitter: renders a bundle into its snippet, shell and links files.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use mdexamples_shared::config::SNIPPET_PLACEHOLDER;
use mdexamples_shared::{EmitConfig, ExampleBundle, MdExamplesError, Result};

/// First line of every shell file.
const SHELL_HEADER: &str = "# Run the example\n";

/// A rendered file, ready to be written into a bundle directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub content: String,
}

/// Filenames of the three generated files for one example name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub snippet: String,
    pub shell: String,
    pub links: String,
}

impl ArtifactNames {
    pub fn new(example_name: &str, emit: &EmitConfig) -> Self {
        Self {
            snippet: format!("{example_name}.{}", emit.snippet_extension),
            shell: format!("{example_name}.{}", emit.command_extension),
            links: format!("{example_name}_links.txt"),
        }
    }

    /// Whether `file_name` is one of the artifact filenames.
    pub fn contains(&self, file_name: &str) -> bool {
        [&self.snippet, &self.shell, &self.links]
            .iter()
            .any(|name| name.as_str() == file_name)
    }
}

/// Render all artifacts for a bundle: snippet, shell, links (in that order).
pub fn render(bundle: &ExampleBundle, emit: &EmitConfig) -> Vec<Artifact> {
    let names = ArtifactNames::new(bundle.id.example_name(), emit);

    vec![
        Artifact {
            content: render_snippet(bundle),
            filename: names.snippet.clone(),
        },
        Artifact {
            content: render_shell(bundle, &names.snippet, emit),
            filename: names.shell,
        },
        Artifact {
            content: render_links(bundle, emit),
            filename: names.links,
        },
    ]
}

/// Snippet file: title, description, then each code block preceded by its
/// annotation as comments.
pub fn render_snippet(bundle: &ExampleBundle) -> String {
    let mut out = format!("# {}\n\n", bundle.title);
    out.push_str(&as_comment(&bundle.description));
    out.push_str("\n\n");

    for block in &bundle.code_blocks {
        if !block.preceding_annotation.is_empty() {
            out.push_str(&as_comment(&block.preceding_annotation));
            out.push('\n');
        }
        out.push_str(block.code.trim());
        out.push_str("\n\n");
    }

    out
}

/// Shell file: each command block with `$ `-prefixed lines, or the default
/// install/run pair when the document has no command fences.
pub fn render_shell(bundle: &ExampleBundle, snippet_file: &str, emit: &EmitConfig) -> String {
    let mut out = String::from(SHELL_HEADER);

    if bundle.command_blocks.is_empty() {
        let run = emit.run_command.replace(SNIPPET_PLACEHOLDER, snippet_file);
        out.push_str("# First, install dependencies\n");
        out.push_str(&format!("$ {}\n\n", emit.install_command));
        out.push_str("# Run the snippet\n");
        out.push_str(&format!("$ {run}\n"));
        return out;
    }

    for block in &bundle.command_blocks {
        if !block.preceding_annotation.is_empty() {
            out.push_str(&as_comment(&block.preceding_annotation));
            out.push('\n');
        }
        for line in block.code.trim().lines() {
            if !line.starts_with('$') {
                out.push_str("$ ");
            }
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

/// Links file: one link per line, or the default link when there are none.
pub fn render_links(bundle: &ExampleBundle, emit: &EmitConfig) -> String {
    let links: Vec<&str> = bundle.links().collect();
    if links.is_empty() {
        return emit.default_link.clone();
    }
    links.join("\n")
}

/// Prefix every line of `text` with `# `.
fn as_comment(text: &str) -> String {
    format!("# {}", text.replace('\n', "\n# "))
}

/// Write rendered artifacts into `dir`. Returns the written paths.
#[instrument(skip_all, fields(dir = %dir.display(), count = artifacts.len()))]
pub fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let path = dir.join(&artifact.filename);
        std::fs::write(&path, &artifact.content).map_err(|e| MdExamplesError::io(&path, e))?;
        debug!(file = %artifact.filename, size = artifact.content.len(), "wrote artifact");
        written.push(path);
    }

    Ok(written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
