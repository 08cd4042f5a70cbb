//! Stripe Patcher: ordered text-patch engine for generated provisioning code
//!
//! Applies an ordered batch of textual edits to a single source artifact.
//! Each edit either replaces every occurrence of an exact literal or
//! replaces every span matching a multi-line pattern, and the result is
//! written back in place only when every required edit matched.
//!
//! # Architecture
//!
//! One spec model drives everything: [`PatchSpec`] pairs a matcher
//! (literal or compiled pattern) with a replacement and a required flag.
//! The matcher resolves specs against the buffer, the applicator performs
//! one replace-all pass per spec, and the run coordinator decides whether
//! the [`Document`] may be persisted.
//!
//! # Safety
//!
//! - Patterns compile at registry construction, never during a run
//! - No write occurs before every required spec has matched
//! - Atomic file writes (tempfile + fsync + rename)
//! - Deterministic: same document and registry always produce the same
//!   output and report
//!
//! # Example
//!
//! ```no_run
//! use stripe_patcher::{runner, PatchSpec, Registry};
//!
//! let registry = Registry::new(
//!     "account-type",
//!     vec![PatchSpec::literal(
//!         "express-to-custom",
//!         "type: 'express',",
//!         "type: 'custom',",
//!     )],
//! )?;
//!
//! let report = runner::execute("server/services/provisioning.ts", &registry)?;
//! assert!(report.completed());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod applicator;
pub mod config;
pub mod document;
pub mod matcher;
pub mod migrations;
pub mod registry;
pub mod runner;
pub mod spec;

// Re-exports
pub use applicator::{apply, PatchResult};
pub use config::{load_from_path, load_from_str, ConfigError};
pub use document::{Document, DocumentError};
pub use registry::{Registry, RegistryError};
pub use runner::{execute, execute_chain, run, RunOutcome, RunReport};
pub use spec::{Matcher, PatchSpec, PatternError};
