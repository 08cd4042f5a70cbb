use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// How a spec locates the text it replaces.
///
/// Both kinds feed the same matcher abstraction; the applicator never
/// needs to know which one it is handling.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Exact substring; every non-overlapping occurrence is replaced.
    Literal(String),
    /// Compiled pattern with `.` spanning newlines, so a single match may
    /// cover an entire multi-line block. Numbered capture groups are
    /// available to the replacement template as `$1`, `${2}`, ...
    Pattern(Regex),
}

impl Matcher {
    pub fn kind(&self) -> &'static str {
        match self {
            Matcher::Literal(_) => "literal",
            Matcher::Pattern(_) => "pattern",
        }
    }
}

/// A malformed pattern. Raised when the spec is constructed, never during
/// a run.
#[derive(Error, Debug)]
#[error("invalid pattern in spec '{spec_id}': {source}")]
pub struct PatternError {
    pub spec_id: String,
    #[source]
    pub source: regex::Error,
}

/// A single declared edit: find, replacement, and a required/optional
/// policy. Immutable once registered; applied strictly in registration
/// order, so later specs see the output of earlier ones.
#[derive(Debug, Clone)]
pub struct PatchSpec {
    pub id: String,
    pub matcher: Matcher,
    pub replacement: String,
    /// When true, zero matches aborts the run before any write.
    pub required: bool,
}

impl PatchSpec {
    /// A required exact-substring spec.
    pub fn literal(
        id: impl Into<String>,
        find: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            matcher: Matcher::Literal(find.into()),
            replacement: replacement.into(),
            required: true,
        }
    }

    /// A required multi-line pattern spec. The pattern compiles here;
    /// a bad pattern never reaches a run.
    pub fn pattern(
        id: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self, PatternError> {
        let id = id.into();
        let regex = compile_pattern(&id, pattern)?;
        Ok(Self {
            id,
            matcher: Matcher::Pattern(regex),
            replacement: replacement.into(),
            required: true,
        })
    }

    /// Mark the spec as non-fatal on zero matches.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// The replacement as plain text, when it contains no capture
    /// references. Used for already-applied detection: a replacement that
    /// interpolates captures renders differently per match and cannot be
    /// searched for.
    pub(crate) fn literal_replacement(&self) -> Option<&str> {
        match &self.matcher {
            Matcher::Literal(_) => Some(&self.replacement),
            Matcher::Pattern(_) if !self.replacement.contains('$') => Some(&self.replacement),
            Matcher::Pattern(_) => None,
        }
    }
}

pub(crate) fn compile_pattern(spec_id: &str, pattern: &str) -> Result<Regex, PatternError> {
    RegexBuilder::new(pattern)
        .dot_matches_new_line(true)
        .build()
        .map_err(|source| PatternError {
            spec_id: spec_id.to_string(),
            source,
        })
}
