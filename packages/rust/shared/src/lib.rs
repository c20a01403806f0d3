//! Shared types, error model, and configuration for mdexamples.
//!
//! This crate is the foundation depended on by all other mdexamples crates.
//! It provides:
//! - [`MdExamplesError`]: the unified error type
//! - Domain types ([`ExampleId`], [`SourceDocument`], [`ExtractedBlock`], [`ExampleBundle`])
//! - Configuration ([`AppConfig`], [`ConvertConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ConvertConfig, DefaultsConfig, DialectsConfig, EmitConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{MdExamplesError, Result};
pub use types::{
    Dialect, ExampleBundle, ExampleId, ExtractedBlock, Reference, ReferenceKind, SectionMap,
    SourceDocument,
};
