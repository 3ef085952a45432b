use crate::error::{PurgeError, Result};
use crate::style::selector::{bem_block, SimpleName};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Selectors that survive pruning regardless of what the content uses.
///
/// Built once from configuration; a pattern that does not compile fails the
/// whole build, before any content is scanned.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    names: HashSet<String>,
    patterns: Vec<Regex>,
    children_patterns: Vec<Regex>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a whitelist from plain names, rule patterns and children patterns.
    pub fn compile<S: AsRef<str>>(
        names: &[S],
        patterns: &[S],
        children_patterns: &[S],
    ) -> Result<Self> {
        Ok(Whitelist {
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            patterns: patterns
                .iter()
                .map(|p| compile_pattern(p.as_ref()))
                .collect::<Result<_>>()?,
            children_patterns: children_patterns
                .iter()
                .map(|p| compile_pattern(p.as_ref()))
                .collect::<Result<_>>()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.patterns.is_empty() && self.children_patterns.is_empty()
    }

    /// Plain whitelisted names count as tokens present in every content file.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// True when a pattern protects the branch `selector`, decomposed into `names`.
    ///
    /// Rule patterns are searched (unanchored) in the branch text and in each
    /// name. Children patterns do the same and also match the BEM block of each
    /// name, so a pattern for a block keeps its `__element`/`--modifier` rules.
    pub fn protects(&self, selector: &str, names: &[SimpleName]) -> bool {
        let hit = |re: &Regex| re.is_match(selector) || names.iter().any(|n| re.is_match(&n.value));

        if self.patterns.iter().any(hit) {
            return true;
        }
        self.children_patterns.iter().any(|re| {
            hit(re)
                || names
                    .iter()
                    .filter_map(|n| bem_block(&n.value))
                    .any(|block| re.is_match(block))
        })
    }
}

/// Compile a pattern written either bare (`^code-block$`) or as a JavaScript
/// regex literal (`/^code-block$/i`).
///
/// Literal flags `i`, `m`, `s` and `x` map onto the regex builder; `g`, `u` and
/// `y` have no meaning for a yes/no search and are ignored.
pub fn compile_pattern(source: &str) -> Result<Regex> {
    let (body, flags) = split_literal(source).unwrap_or((source, ""));

    RegexBuilder::new(body)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build()
        .map_err(|source_err| PurgeError::InvalidPattern {
            pattern: source.to_string(),
            source: source_err,
        })
}

fn split_literal(source: &str) -> Option<(&str, &str)> {
    let inner = source.strip_prefix('/')?;
    let close = inner.rfind('/')?;
    let (body, flags) = (&inner[..close], &inner[close + 1..]);
    let valid_flags = flags.chars().all(|c| "gimsuxy".contains(c));
    (!body.is_empty() && valid_flags).then_some((body, flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::selector::decompose;

    fn protects(whitelist: &Whitelist, selector: &str) -> bool {
        whitelist.protects(selector, &decompose(selector))
    }

    #[test]
    fn test_literal_and_bare_patterns() {
        assert!(compile_pattern("/^code-block$/").unwrap().is_match("code-block"));
        assert!(compile_pattern("^code-block$").unwrap().is_match("code-block"));
        assert!(compile_pattern("/^BTN$/i").unwrap().is_match("btn"));
        // Not a literal: the trailing segment is not a flag set.
        assert!(compile_pattern("/a/b").unwrap().is_match("x/a/b"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = compile_pattern("/(unclosed/").unwrap_err();
        match err {
            PurgeError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "/(unclosed/"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(Whitelist::compile(&["ok"], &["["], &[]).is_err());
    }

    #[test]
    fn test_rule_pattern_searches_text_and_names() {
        let whitelist = Whitelist::compile::<&str>(&[], &["^modal"], &[]).unwrap();
        assert!(protects(&whitelist, ".modal-open"));
        assert!(protects(&whitelist, "body .modal"));
        // Plain rule patterns do not reach BEM children.
        let anchored = Whitelist::compile::<&str>(&[], &["^modal$"], &[]).unwrap();
        assert!(!protects(&anchored, ".modal__title"));
    }

    #[test]
    fn test_children_pattern_covers_descendants_and_bem_children() {
        let whitelist = Whitelist::compile::<&str>(&[], &[], &["/^code-block$/"]).unwrap();
        assert!(protects(&whitelist, ".code-block"));
        assert!(protects(&whitelist, ".code-block pre"));
        assert!(protects(&whitelist, ".code-block__child"));
        assert!(protects(&whitelist, ".code-block--dark .token"));
        assert!(!protects(&whitelist, ".code-blocks"));
        assert!(!protects(&whitelist, ".unused"));
    }
}
