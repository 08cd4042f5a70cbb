//! The run coordinator: drives a registry through the applicator in
//! registration order, accumulates results, and decides whether the run
//! may proceed to persistence.

use crate::applicator::{self, PatchResult};
use crate::document::{Document, DocumentError};
use crate::registry::Registry;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every required spec matched at least once (or was already applied).
    Completed,
    /// A required spec found zero matches; nothing was written.
    Aborted,
}

/// Per-run report, accumulated in spec order. Informational only: the
/// coordinator's own outcome determination is authoritative, and the
/// report serializes to JSON for machine checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use = "RunReport carries the success/abort signal for the run"]
pub struct RunReport {
    pub registry: String,
    pub results: Vec<PatchResult>,
    pub outcome: RunOutcome,
    /// On abort, the id of the required spec that found zero matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_spec_id: Option<String>,
}

impl RunReport {
    pub fn completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }

    pub fn applied_count(&self) -> usize {
        self.results.iter().filter(|r| r.applied).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results.iter().filter(|r| !r.applied).count()
    }
}

/// Apply every spec of `registry` to the buffer, in registration order.
///
/// Fails fast: the first required spec with zero matches (that is not
/// detectably already applied) aborts the run, and later specs are not
/// attempted since they may assume the missing edit's effect. The buffer
/// keeps the edits made before the abort; callers gate persistence on
/// [`RunReport::completed`].
pub fn run(document: &mut Document, registry: &Registry) -> RunReport {
    let mut results = Vec::with_capacity(registry.len());

    for spec in registry.specs() {
        let result = applicator::apply(document, spec);
        let failed = spec.required && result.matches_found == 0 && !result.is_already_applied();
        results.push(result);

        if failed {
            return RunReport {
                registry: registry.name().to_string(),
                results,
                outcome: RunOutcome::Aborted,
                failed_spec_id: Some(spec.id.clone()),
            };
        }
    }

    RunReport {
        registry: registry.name().to_string(),
        results,
        outcome: RunOutcome::Completed,
        failed_spec_id: None,
    }
}

/// The full pipeline: load the artifact, apply the registry, and persist
/// the result only when the run completed. On abort or error the on-disk
/// artifact is untouched.
pub fn execute(path: impl AsRef<Path>, registry: &Registry) -> Result<RunReport, DocumentError> {
    let mut document = Document::load(path.as_ref())?;
    let report = run(&mut document, registry);
    if report.completed() {
        document.write()?;
    }
    Ok(report)
}

/// Apply several registries in sequence, each as its own load/patch/write
/// run, so every batch sees the previous batch's persisted output. Stops
/// at the first aborted batch.
pub fn execute_chain(
    path: impl AsRef<Path>,
    registries: &[Registry],
) -> Result<Vec<RunReport>, DocumentError> {
    let path = path.as_ref();
    let mut reports = Vec::with_capacity(registries.len());

    for registry in registries {
        let report = execute(path, registry)?;
        let aborted = !report.completed();
        reports.push(report);
        if aborted {
            break;
        }
    }

    Ok(reports)
}
