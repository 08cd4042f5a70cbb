//! Span resolution for both spec kinds.
//!
//! Matching is deterministic and stateless between specs: resolving the
//! same spec against the same text twice yields the same outcome.

use crate::spec::{Matcher, PatchSpec};

/// The result of resolving one spec against buffer content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Non-overlapping matches found, counted left to right.
    pub count: usize,
    /// The buffer with every match replaced, rendered in a single pass.
    /// `None` when nothing matched.
    pub text: Option<String>,
}

impl MatchOutcome {
    fn miss() -> Self {
        Self {
            count: 0,
            text: None,
        }
    }
}

/// Resolve `spec` against `content` in one left-to-right pass.
///
/// Literal specs replace every non-overlapping occurrence of the exact
/// text. Pattern specs replace every match of the compiled multi-line
/// pattern, each match's own captured groups populating its own
/// replacement instance. There is only ever one pass: a replacement that
/// re-introduces the search text is not matched again.
pub fn resolve(spec: &PatchSpec, content: &str) -> MatchOutcome {
    match &spec.matcher {
        Matcher::Literal(find) => {
            let count = content.matches(find.as_str()).count();
            if count == 0 {
                return MatchOutcome::miss();
            }
            MatchOutcome {
                count,
                text: Some(content.replace(find.as_str(), &spec.replacement)),
            }
        }
        Matcher::Pattern(regex) => {
            let count = regex.find_iter(content).count();
            if count == 0 {
                return MatchOutcome::miss();
            }
            MatchOutcome {
                count,
                text: Some(
                    regex
                        .replace_all(content, spec.replacement.as_str())
                        .into_owned(),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::PatchSpec;

    #[test]
    fn test_literal_replaces_every_occurrence() {
        let spec = PatchSpec::literal("type", "type: 'express',", "type: 'custom',");
        let content = "a { type: 'express', }\nb { type: 'express', }\n";

        let outcome = resolve(&spec, content);
        assert_eq!(outcome.count, 2);
        let text = outcome.text.unwrap();
        assert!(!text.contains("express"));
        assert_eq!(text.matches("type: 'custom',").count(), 2);
    }

    #[test]
    fn test_literal_miss_leaves_text_unrendered() {
        let spec = PatchSpec::literal("type", "absent", "present");
        let outcome = resolve(&spec, "nothing to see");
        assert_eq!(outcome.count, 0);
        assert_eq!(outcome.text, None);
    }

    #[test]
    fn test_literal_single_pass_even_when_replacement_contains_find() {
        // "aa" -> "aaa" must not cascade into further passes.
        let spec = PatchSpec::literal("grow", "aa", "aaa");
        let outcome = resolve(&spec, "aa aa");
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.text.unwrap(), "aaa aaa");
    }

    #[test]
    fn test_literal_occurrences_are_non_overlapping() {
        let spec = PatchSpec::literal("pair", "aa", "b");
        let outcome = resolve(&spec, "aaa");
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.text.unwrap(), "ba");
    }

    #[test]
    fn test_pattern_spans_lines_and_substitutes_captures() {
        let spec = PatchSpec::pattern(
            "block",
            r"name: '(\w+)',\s+legacy: \{.*?\},",
            "name: '$1',",
        )
        .unwrap();
        let content = "name: 'acct',\n  legacy: {\n    a: 1,\n    b: 2\n  },\nrest";

        let outcome = resolve(&spec, content);
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.text.unwrap(), "name: 'acct',\nrest");
    }

    #[test]
    fn test_pattern_each_match_uses_own_captures() {
        let spec = PatchSpec::pattern("quote", r"<(\w+)>", "[$1]").unwrap();
        let outcome = resolve(&spec, "<one> and <two>");
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.text.unwrap(), "[one] and [two]");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let spec = PatchSpec::pattern("caps", r"(\w+): \{.*?\}", "$1: {}").unwrap();
        let content = "a: { x }\nb: { y\n z }\n";
        assert_eq!(resolve(&spec, content), resolve(&spec, content));
    }
}
