//! Example bundle construction.
//!
//! Turns a parsed document into an [`ExampleBundle`], resolving local image
//! references and copying the images into the bundle directory on the way.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};
use url::Url;

use mdexamples_markdown::ParsedDocument;
use mdexamples_shared::{ExampleBundle, ExampleId, MdExamplesError, Reference, Result};

use crate::emitter::ArtifactNames;

/// Build the bundle for one document.
///
/// `doc_dir` is the directory the document lives in; `bundle_dir` must
/// already exist and receives copies of every resolvable image. Images are
/// never copied over one of the `artifacts` filenames.
pub fn build_bundle(
    id: ExampleId,
    parsed: ParsedDocument,
    doc_dir: &Path,
    bundle_dir: &Path,
    artifacts: &ArtifactNames,
) -> Result<ExampleBundle> {
    let title = parsed.title.unwrap_or_else(|| {
        debug!(%id, "no top-level heading, deriving title from identifier");
        id.fallback_title()
    });

    let images = resolve_images(parsed.images, doc_dir, bundle_dir, artifacts)?;

    let mut references = parsed.links;
    references.extend(images);

    Ok(ExampleBundle {
        id,
        title,
        description: parsed.description,
        code_blocks: parsed.code_blocks,
        command_blocks: parsed.command_blocks,
        references,
    })
}

/// Copy local images into `bundle_dir`.
///
/// A resolved image is recorded under its base filename. Images that do not
/// resolve to a file, or whose base filename clashes with an artifact, keep
/// their original target and are not copied. When two images share a base
/// filename the later copy wins.
pub fn resolve_images(
    images: Vec<Reference>,
    doc_dir: &Path,
    bundle_dir: &Path,
    artifacts: &ArtifactNames,
) -> Result<Vec<Reference>> {
    let mut resolved = Vec::with_capacity(images.len());
    let mut copied = HashSet::new();

    for mut image in images {
        if is_remote(&image.target) {
            debug!(target_url = %image.target, "remote image, not copied");
            resolved.push(image);
            continue;
        }

        let source = doc_dir.join(&image.target);
        let file_name = Path::new(&image.target)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);

        match file_name {
            Some(name) if source.is_file() && artifacts.contains(&name) => {
                warn!(
                    image = %image.target,
                    file = %name,
                    "image filename clashes with a bundle artifact, not copied"
                );
            }
            Some(name) if source.is_file() => {
                let dest = bundle_dir.join(&name);
                if !copied.insert(name.clone()) {
                    warn!(
                        image = %image.target,
                        file = %name,
                        "another image with this filename was already copied, overwriting"
                    );
                }
                std::fs::copy(&source, &dest).map_err(|e| MdExamplesError::io(&source, e))?;
                info!(file = %name, "copied image");
                image.target = name;
            }
            _ => {
                warn!(
                    image = %image.target,
                    resolved = %source.display(),
                    "image reference does not resolve to a file, not copied"
                );
            }
        }

        resolved.push(image);
    }

    Ok(resolved)
}

fn is_remote(target: &str) -> bool {
    Url::parse(target).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
