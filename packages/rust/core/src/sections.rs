//! Section map loading.
//!
//! The sidecar groups example ids into site sections:
//!
//! ```text
//! { "sections": [ { "id": "basics", "examples": ["001-getting-started"] } ] }
//! ```
//!
//! Conversion never fails because of it: a missing or broken sidecar
//! yields an empty map.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use mdexamples_shared::{MdExamplesError, Result, SectionMap};

#[derive(Debug, Deserialize)]
struct SectionsFile {
    #[serde(default)]
    sections: Vec<SectionEntry>,
}

#[derive(Debug, Deserialize)]
struct SectionEntry {
    id: String,
    #[serde(default)]
    examples: Vec<String>,
}

/// Parse sidecar JSON into a [`SectionMap`].
pub fn parse_section_map(json: &str) -> Result<SectionMap> {
    let file: SectionsFile = serde_json::from_str(json)
        .map_err(|e| MdExamplesError::parse(format!("invalid sections file: {e}")))?;

    let mut map = SectionMap::default();
    for section in file.sections {
        for example in section.examples {
            map.insert(example, section.id.clone());
        }
    }
    Ok(map)
}

/// Load the section map, degrading to an empty map on any failure.
pub fn load_section_map(path: &Path) -> SectionMap {
    if !path.exists() {
        debug!(path = %path.display(), "no section map, continuing without one");
        return SectionMap::default();
    }

    let loaded = std::fs::read_to_string(path)
        .map_err(|e| MdExamplesError::io(path, e))
        .and_then(|json| parse_section_map(&json));

    match loaded {
        Ok(map) => {
            debug!(path = %path.display(), entries = map.len(), "section map loaded");
            map
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "section map unavailable, using empty map");
            SectionMap::default()
        }
    }
}
