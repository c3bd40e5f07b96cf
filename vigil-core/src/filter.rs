//! Include/exclude name filter
//!
//! Patterns use shell-glob wildcards (`*`, `?`, `[...]`). A `*` also matches
//! `/`, so `folder/*` selects every job nested anywhere below `folder`.
//! A run of stars inside a path component (`team-**`) means the same as one
//! star; a whole `**` component keeps its recursive meaning.
//!
//! A name passes when the include list is empty or one include pattern
//! matches, and no exclude pattern matches.

use glob::Pattern;
use thiserror::Error;

/// Errors raised while compiling a filter
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Compiled include/exclude matcher. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl Filter {
    /// Compiles both pattern lists, failing on the first malformed pattern
    pub fn compile<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, FilterError> {
        Ok(Self {
            include: compile_all(include)?,
            exclude: compile_all(exclude)?,
        })
    }

    /// A filter that passes every name
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn matches(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(name));
        included && !self.exclude.iter().any(|p| p.matches(name))
    }
}

fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>, FilterError> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Pattern::new(&collapse_stars(p)).map_err(|e| FilterError::InvalidPattern {
                pattern: p.to_string(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

/// Squeezes `**` runs to `*` in every component that is not exactly `**`
fn collapse_stars(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|component| {
            if component == "**" {
                return component.to_string();
            }
            let mut out = String::with_capacity(component.len());
            for c in component.chars() {
                if c != '*' || !out.ends_with('*') {
                    out.push(c);
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NONE: &[&str] = &[];

    #[yare::parameterized(
        empty_lists       = { NONE,            NONE,          "anything",        true },
        exact_include     = { &["test"],       NONE,          "test",            true },
        exact_miss        = { &["test"],       NONE,          "default",         false },
        star_include      = { &["build-*"],    NONE,          "build-linux",     true },
        star_crosses_path = { &["folder/*"],   NONE,          "folder/a/b",      true },
        leaf_only_miss    = { &["main"],       NONE,          "folder/main",     false },
        exclude_wins      = { &["*"],          &["*-tmp"],    "job-tmp",         false },
        exclude_only      = { NONE,            &["secret*"],  "secret-job",      false },
        exclude_other     = { NONE,            &["secret*"],  "public-job",      true },
        question_mark     = { &["node-?"],     NONE,          "node-1",          true },
        char_class        = { &["node-[ab]"],  NONE,          "node-c",          false },
        double_star_tail  = { &["team-**"],    NONE,          "team-a/b",        true },
        double_star_mid   = { &["a**b"],       NONE,          "a/x/b",           true },
        recursive_dir     = { &["folder/**"],  NONE,          "folder/a/b",      true },
        recursive_prefix  = { &["**/deploy"],  NONE,          "x/y/deploy",      true },
        double_star_excl  = { NONE,            &["*-tmp**"],  "job-tmp-1",       false },
    )]
    fn filter_matching(include: &[&str], exclude: &[&str], name: &str, expected: bool) {
        let filter = Filter::compile(include, exclude).unwrap();
        assert_eq!(filter.matches(name), expected);
    }

    #[test]
    fn test_malformed_pattern_is_rejected() {
        let err = Filter::compile(&["[abc"], NONE).unwrap_err();
        assert!(matches!(err, FilterError::InvalidPattern { ref pattern, .. } if pattern == "[abc"));

        assert!(Filter::compile(NONE, &["ok", "[oops"]).is_err());
    }

    #[test]
    fn test_collapse_stars() {
        assert_eq!(collapse_stars("team-**"), "team-*");
        assert_eq!(collapse_stars("a***b/**/c**"), "a*b/**/c*");
        assert_eq!(collapse_stars("**"), "**");
        assert_eq!(collapse_stars("plain"), "plain");
    }

    #[test]
    fn test_error_names_pattern_as_written() {
        let err = Filter::compile(&["team-**[x"], NONE).unwrap_err();
        assert!(matches!(err, FilterError::InvalidPattern { ref pattern, .. } if pattern == "team-**[x"));
    }

    #[test]
    fn test_allow_all() {
        assert!(Filter::allow_all().matches(""));
        assert!(Filter::allow_all().matches("a/b/c"));
    }

    proptest! {
        #[test]
        fn empty_include_matches_unless_excluded(
            name in "[a-z]{1,8}",
            exclude in proptest::collection::vec("[a-z]{1,8}", 0..4),
        ) {
            prop_assume!(!exclude.contains(&name));
            let filter = Filter::compile(&Vec::<String>::new(), &exclude).unwrap();
            prop_assert!(filter.matches(&name));
        }

        #[test]
        fn include_list_is_exact_for_literals(
            name in "[a-z]{1,8}",
            include in proptest::collection::vec("[a-z]{1,8}", 1..4),
            exclude in proptest::collection::vec("[a-z]{1,8}", 0..4),
        ) {
            let filter = Filter::compile(&include, &exclude).unwrap();
            let expected = include.contains(&name) && !exclude.contains(&name);
            prop_assert_eq!(filter.matches(&name), expected);
        }
    }
}
