//! Substitution of one spec's matches into the document buffer.

use crate::document::Document;
use crate::matcher;
use crate::spec::PatchSpec;
use serde::Serialize;
use std::fmt;

/// Outcome of one spec's replace-all pass. Created once per spec per run,
/// held only for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use = "PatchResult should be checked for applied/skipped status"]
pub struct PatchResult {
    pub spec_id: String,
    pub matches_found: usize,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PatchResult {
    pub(crate) const ALREADY_APPLIED: &'static str = "already applied";

    /// True when the spec found nothing but its replacement text is
    /// already present in the buffer, i.e. the document was migrated by
    /// an earlier run.
    pub fn is_already_applied(&self) -> bool {
        self.note.as_deref() == Some(Self::ALREADY_APPLIED)
    }
}

impl fmt::Display for PatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.applied {
            write!(f, "{}: applied ({} matches)", self.spec_id, self.matches_found)
        } else {
            match &self.note {
                Some(note) => write!(f, "{}: skipped ({})", self.spec_id, note),
                None => write!(f, "{}: skipped (no matches)", self.spec_id),
            }
        }
    }
}

/// Run the matcher for `spec` and substitute all of its matches into the
/// buffer. The buffer mutates exactly once when anything matched and is
/// untouched otherwise; there is no partial application within a spec.
pub fn apply(document: &mut Document, spec: &PatchSpec) -> PatchResult {
    let outcome = matcher::resolve(spec, document.text());

    match outcome.text {
        Some(text) => {
            document.set_text(text);
            PatchResult {
                spec_id: spec.id.clone(),
                matches_found: outcome.count,
                applied: true,
                note: None,
            }
        }
        None => {
            let note = spec
                .literal_replacement()
                .filter(|replacement| {
                    !replacement.is_empty() && document.text().contains(*replacement)
                })
                .map(|_| PatchResult::ALREADY_APPLIED.to_string());
            PatchResult {
                spec_id: spec.id.clone(),
                matches_found: 0,
                applied: false,
                note,
            }
        }
    }
}
