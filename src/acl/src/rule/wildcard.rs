use super::{split_segments, MatchOutcome, Rule, WILDCARD};
use crate::evaluator::Evaluator;

/// Rule whose definition may end with a `*` segment
///
/// With a trailing wildcard, `prefix.*` matches any resource that starts with
/// the same segments and has at least one segment in place of the wildcard.
/// The level is `segments(resource) - segments(definition) + 1`, so
/// `prefix.x` matches at level 1 and `prefix.x.y` at level 2. The prefix
/// itself (`prefix`) does not match.
///
/// Without a trailing wildcard the rule behaves like [`ExactRule`](super::ExactRule).
#[derive(Debug, Clone)]
pub struct WildcardSuffixRule {
    definition: String,
    evaluator: Evaluator,

    /// Definition split on the segment delimiter
    segments: Vec<String>,

    /// Last segment is the wildcard marker
    has_wildcard: bool,
}

impl WildcardSuffixRule {
    pub fn new(definition: impl Into<String>, evaluator: Evaluator) -> Self {
        let definition = definition.into();
        let segments = split_segments(&definition);
        let has_wildcard = segments.last().is_some_and(|last| last == WILDCARD);

        Self {
            definition,
            evaluator,
            segments,
            has_wildcard,
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl Rule for WildcardSuffixRule {
    fn definition(&self) -> &str {
        &self.definition
    }

    fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    fn match_resource(&self, resource: &str) -> MatchOutcome {
        if !self.has_wildcard {
            return if self.definition == resource {
                MatchOutcome::Matched { level: 0 }
            } else {
                MatchOutcome::NotMatched
            };
        }

        let parts: Vec<&str> = resource.split(super::SEGMENT_DELIMITER).collect();
        if parts.len() < self.segments.len() {
            return MatchOutcome::NotMatched;
        }

        let prefix = &self.segments[..self.segments.len() - 1];
        if prefix.iter().zip(&parts).any(|(expected, actual)| expected != actual) {
            return MatchOutcome::NotMatched;
        }

        MatchOutcome::Matched {
            level: parts.len() - self.segments.len() + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rule(definition: &str) -> WildcardSuffixRule {
        WildcardSuffixRule::new(definition, Evaluator::allow())
    }

    #[test]
    fn test_parsing() {
        let with = rule("foo.bar.*");
        assert!(with.has_wildcard());
        assert_eq!(with.segments(), &["foo", "bar", "*"]);

        let without = rule("foo.bar");
        assert!(!without.has_wildcard());

        // Wildcard only counts as the whole last segment
        assert!(!rule("foo.bar*").has_wildcard());
        assert!(!rule("foo.*.bar").has_wildcard());
    }

    #[test]
    fn test_wildcard_levels() {
        let rule = rule("foo.bar.foo-bar.*");

        assert_eq!(rule.match_resource("foo.bar.foo-bar.my"), MatchOutcome::Matched { level: 1 });
        assert_eq!(
            rule.match_resource("foo.bar.foo-bar.my.resource"),
            MatchOutcome::Matched { level: 2 }
        );
        assert_eq!(
            rule.match_resource("foo.bar.foo-bar.a.b.c"),
            MatchOutcome::Matched { level: 4 }
        );
    }

    #[test]
    fn test_wildcard_rejections() {
        let rule = rule("foo.bar.foo-bar.*");

        // Prefix alone leaves nothing for the wildcard
        assert_eq!(rule.match_resource("foo.bar.foo-bar"), MatchOutcome::NotMatched);
        assert_eq!(rule.match_resource("foo.bar"), MatchOutcome::NotMatched);
        assert_eq!(
            rule.match_resource("bar.foo.bar-foo.not.matching"),
            MatchOutcome::NotMatched
        );
        assert_eq!(rule.match_resource("foo.baz.foo-bar.x"), MatchOutcome::NotMatched);
    }

    #[test]
    fn test_without_wildcard_is_exact() {
        let rule = rule("foo.bar");

        assert_eq!(rule.match_resource("foo.bar"), MatchOutcome::Matched { level: 0 });
        assert_eq!(rule.match_resource("foo.bar.baz"), MatchOutcome::NotMatched);
    }

    #[test]
    fn test_bare_wildcard_matches_everything() {
        let rule = rule("*");

        assert_eq!(rule.match_resource("anything"), MatchOutcome::Matched { level: 1 });
        assert_eq!(rule.match_resource("a.b"), MatchOutcome::Matched { level: 2 });
    }

    proptest! {
        #[test]
        fn prop_fewer_trailing_segments_is_more_specific(
            prefix in prop::collection::vec("[a-z]{1,6}", 1..4),
            tail in prop::collection::vec("[a-z]{1,6}", 1..6),
        ) {
            let definition = format!("{}.*", prefix.join("."));
            let rule = rule(&definition);

            let shorter = format!("{}.{}", prefix.join("."), tail[0]);
            let longer = format!("{}.{}", prefix.join("."), tail.join("."));

            let short_level = rule.match_resource(&shorter).level().unwrap();
            let long_level = rule.match_resource(&longer).level().unwrap();

            prop_assert_eq!(short_level, 1);
            prop_assert_eq!(long_level, tail.len());
            prop_assert!(short_level <= long_level);
        }
    }
}
