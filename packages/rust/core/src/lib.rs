//! Conversion pipeline and domain logic for mdexamples.
//!
//! This crate ties markdown analysis, image resolution, bundle emission and
//! the section map together into the batch `convert` workflow, plus the
//! bundle linter used by `check`.

pub mod bundle;
pub mod emitter;
pub mod lint;
pub mod pipeline;
pub mod sections;
