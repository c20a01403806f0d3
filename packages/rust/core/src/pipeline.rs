//! End-to-end `convert` pipeline: markdown directory → example bundles.
//!
//! Documents are processed one at a time in filename order. A document whose
//! bundle directory already exists is skipped, which makes re-runs no-ops.
//! Each bundle is written into a hidden staging directory first and renamed
//! into place once complete, so an interrupted run never leaves a partial
//! bundle under the final name.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use mdexamples_markdown::ParseOptions;
use mdexamples_shared::{ConvertConfig, ExampleId, MdExamplesError, Result, SourceDocument};

use crate::bundle::build_bundle;
use crate::emitter::{ArtifactNames, render, write_artifacts};
use crate::sections::load_section_map;

/// What happened to one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// A new bundle was written.
    Converted,
    /// The bundle directory already existed.
    Skipped,
}

/// Summary of a batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Candidate documents found.
    pub seen: usize,
    /// Documents converted into new bundles.
    pub converted: usize,
    /// Documents skipped because their bundle exists.
    pub skipped: usize,
    /// Entries in the section map (loaded, not otherwise used).
    pub section_map_entries: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting batch status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each document with its outcome.
    fn document_done(&self, id: &str, outcome: DocumentOutcome, current: usize, total: usize);
    /// Called when the batch completes.
    fn done(&self, report: &BatchReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn document_done(
        &self,
        _id: &str,
        _outcome: DocumentOutcome,
        _current: usize,
        _total: usize,
    ) {
    }
    fn done(&self, _report: &BatchReport) {}
}

/// Convert every candidate document in `markdown_dir`.
///
/// 1. Load the section map (failures degrade to an empty map)
/// 2. Collect candidate documents in sorted order
/// 3. Skip or convert each one
#[instrument(skip_all, fields(input = %markdown_dir.display(), output = %config.output_dir.display()))]
pub fn convert_directory(
    markdown_dir: &Path,
    config: &ConvertConfig,
    progress: &dyn ProgressReporter,
) -> Result<BatchReport> {
    let start = Instant::now();
    config.validate()?;

    if !markdown_dir.is_dir() {
        return Err(MdExamplesError::InputNotFound {
            path: markdown_dir.to_path_buf(),
        });
    }

    progress.phase("Loading section map");
    let section_map = load_section_map(&config.sections_file);

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| MdExamplesError::io(&config.output_dir, e))?;

    progress.phase("Converting documents");
    let documents = collect_documents(markdown_dir, config)?;
    let total = documents.len();
    info!(total, "found source documents");

    let mut converted = 0;
    let mut skipped = 0;

    for (i, path) in documents.iter().enumerate() {
        let outcome = convert_document(path, config)?;
        match outcome {
            DocumentOutcome::Converted => converted += 1,
            DocumentOutcome::Skipped => skipped += 1,
        }
        progress.document_done(&display_id(path), outcome, i + 1, total);
    }

    let report = BatchReport {
        seen: total,
        converted,
        skipped,
        section_map_entries: section_map.len(),
        elapsed: start.elapsed(),
    };

    info!(
        seen = report.seen,
        converted = report.converted,
        skipped = report.skipped,
        "conversion complete"
    );
    progress.done(&report);

    Ok(report)
}

/// List candidate documents in `markdown_dir`, sorted by filename.
///
/// Candidates are regular files with the configured extension, minus the
/// reserved index document.
pub fn collect_documents(markdown_dir: &Path, config: &ConvertConfig) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(markdown_dir).map_err(|e| MdExamplesError::io(markdown_dir, e))?;

    let mut documents = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MdExamplesError::io(markdown_dir, e))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(config.source_extension.as_str()) {
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()) == Some(config.index_document.as_str()) {
            debug!(path = %path.display(), "skipping index document");
            continue;
        }
        documents.push(path);
    }

    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}

/// Convert one document into its bundle directory, unless it already exists.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn convert_document(path: &Path, config: &ConvertConfig) -> Result<DocumentOutcome> {
    let id = ExampleId::from_path(path)?;
    let bundle_dir = config.output_dir.join(id.as_str());

    if bundle_dir.exists() {
        info!(%id, dir = %bundle_dir.display(), "bundle directory already exists, skipping");
        return Ok(DocumentOutcome::Skipped);
    }

    info!(%id, "converting");
    let document = SourceDocument::read(path)?;

    let staging = staging_dir(&config.output_dir, &id);
    if staging.exists() {
        warn!(dir = %staging.display(), "removing stale staging directory from an earlier run");
        remove_dir(&staging)?;
    }
    std::fs::create_dir_all(&staging).map_err(|e| MdExamplesError::io(&staging, e))?;

    match write_bundle(&document, id.clone(), config, &staging) {
        Ok(()) => {
            std::fs::rename(&staging, &bundle_dir)
                .map_err(|e| MdExamplesError::io(&bundle_dir, e))?;
            info!(%id, dir = %bundle_dir.display(), "converted example");
            Ok(DocumentOutcome::Converted)
        }
        Err(e) => {
            if let Err(cleanup) = remove_dir(&staging) {
                warn!(dir = %staging.display(), error = %cleanup, "failed to remove staging directory");
            }
            Err(e)
        }
    }
}

/// Parse, build and emit one bundle into `dir`.
fn write_bundle(
    document: &SourceDocument,
    id: ExampleId,
    config: &ConvertConfig,
    dir: &Path,
) -> Result<()> {
    let opts = ParseOptions {
        snippet_tags: config.snippet_tags.clone(),
        command_tags: config.command_tags.clone(),
    };
    let parsed = mdexamples_markdown::parse(&document.raw_text, &opts);
    let artifacts = ArtifactNames::new(id.example_name(), &config.emit);
    let bundle = build_bundle(id, parsed, document.parent_dir(), dir, &artifacts)?;

    let artifacts = render(&bundle, &config.emit);
    write_artifacts(dir, &artifacts)?;
    Ok(())
}

/// Hidden sibling directory a bundle is assembled in before the rename.
fn staging_dir(output_dir: &Path, id: &ExampleId) -> PathBuf {
    output_dir.join(format!(".{id}.partial"))
}

fn remove_dir(dir: &Path) -> Result<()> {
    std::fs::remove_dir_all(dir).map_err(|e| MdExamplesError::io(dir, e))
}

fn display_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
