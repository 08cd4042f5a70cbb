//! Patch-file loading: TOML schema, validation, and compilation into a
//! ready [`crate::Registry`].

mod loader;
mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{Metadata, PatchEntry, PatchFile, SpecKind, ValidationError, ValidationIssue};
