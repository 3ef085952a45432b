//! Deciding which rules of a stylesheet survive.
//!
//! A selector branch survives when any of its names was seen in content, when a
//! whitelist protects it, or when it names nothing that content could contain
//! (`*`, `:root`, `&`). A rule keeps its surviving branches and is dropped once
//! none are left. Surviving rules keep their document order.

use crate::style::owned_css::{OwnedRule, OwnedStyleRule, OwnedStylesheet};
use crate::style::selector::decompose;
use crate::style::whitelist::Whitelist;
use crate::tokens::TokenSet;
use std::collections::HashSet;

/// Per-rule outcome: one flag per selector branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneDecision {
    pub branches: Vec<bool>,
}

impl PruneDecision {
    /// The rule is kept when at least one branch is.
    pub fn keep(&self) -> bool {
        self.branches.iter().any(|&b| b)
    }
}

/// Optional passes over at-rules that depend on what style rules survived.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneOptions {
    /// Drop `@keyframes` no surviving `animation` declaration refers to.
    pub keyframes: bool,
    /// Drop `@font-face` no surviving `font`/`font-family` declaration refers to.
    pub font_face: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PruneOutcome {
    pub stylesheet: OwnedStylesheet,
    /// Removed selector branches (and `@keyframes`/`@font-face` headers), in document order.
    pub rejected: Vec<String>,
}

pub struct SelectorPruner<'a> {
    tokens: &'a TokenSet,
    whitelist: &'a Whitelist,
    options: PruneOptions,
}

impl<'a> SelectorPruner<'a> {
    pub fn new(tokens: &'a TokenSet, whitelist: &'a Whitelist) -> Self {
        SelectorPruner {
            tokens,
            whitelist,
            options: PruneOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PruneOptions) -> Self {
        self.options = options;
        self
    }

    pub fn keep_branch(&self, selector: &str) -> bool {
        // Extractors may emit selectors with their sigils (`.btn`, `#main`).
        if self.tokens.contains(selector) {
            return true;
        }
        let names = decompose(selector);
        if names.iter().all(|n| n.is_pseudo()) {
            return true;
        }
        let used = names
            .iter()
            .any(|n| self.tokens.contains(&n.value) || self.whitelist.contains_name(&n.value));
        used || self.whitelist.protects(selector, &names)
    }

    pub fn decide(&self, selectors: &[String]) -> PruneDecision {
        PruneDecision {
            branches: selectors.iter().map(|s| self.keep_branch(s)).collect(),
        }
    }

    pub fn prune(&self, stylesheet: &OwnedStylesheet) -> PruneOutcome {
        let mut rejected = Vec::new();
        let mut rules = self.prune_rules(&stylesheet.rules, &mut rejected);

        if self.options.keyframes || self.options.font_face {
            let usage = AtRuleUsage::collect(&rules);
            rules = self.prune_at_rules(rules, &usage, &mut rejected);
        }

        PruneOutcome {
            stylesheet: OwnedStylesheet { rules },
            rejected,
        }
    }

    fn prune_rules(&self, rules: &[OwnedRule], rejected: &mut Vec<String>) -> Vec<OwnedRule> {
        let mut kept = Vec::with_capacity(rules.len());
        for rule in rules {
            match rule {
                OwnedRule::Style(style) => {
                    if let Some(style) = self.prune_style_rule(style, rejected) {
                        kept.push(OwnedRule::Style(style));
                    }
                }
                OwnedRule::Group(group) => {
                    let inner = self.prune_rules(&group.rules, rejected);
                    if !inner.is_empty() {
                        let mut group = group.clone();
                        group.rules = inner;
                        kept.push(OwnedRule::Group(group));
                    }
                }
                other => kept.push(other.clone()),
            }
        }
        kept
    }

    fn prune_style_rule(
        &self,
        style: &OwnedStyleRule,
        rejected: &mut Vec<String>,
    ) -> Option<OwnedStyleRule> {
        let decision = self.decide(&style.selectors);
        let mut selectors = Vec::with_capacity(style.selectors.len());
        for (selector, keep) in style.selectors.iter().zip(&decision.branches) {
            if *keep {
                selectors.push(selector.clone());
            } else {
                rejected.push(selector.clone());
            }
        }
        if !decision.keep() {
            return None;
        }

        Some(OwnedStyleRule {
            selectors,
            declarations: style.declarations.clone(),
            rules: self.prune_rules(&style.rules, rejected),
        })
    }

    fn prune_at_rules(
        &self,
        rules: Vec<OwnedRule>,
        usage: &AtRuleUsage,
        rejected: &mut Vec<String>,
    ) -> Vec<OwnedRule> {
        let mut kept = Vec::with_capacity(rules.len());
        for rule in rules {
            match rule {
                OwnedRule::Keyframes(k) if self.options.keyframes && !usage.animates(&k.name) => {
                    rejected.push(format!("@keyframes {}", k.name));
                }
                OwnedRule::FontFace(f) if self.options.font_face && !usage.uses_font(&f.family) => {
                    rejected.push(format!(
                        "@font-face {}",
                        f.family.as_deref().unwrap_or_default()
                    ));
                }
                OwnedRule::Group(mut group) => {
                    group.rules = self.prune_at_rules(group.rules, usage, rejected);
                    if !group.rules.is_empty() {
                        kept.push(OwnedRule::Group(group));
                    }
                }
                other => kept.push(other),
            }
        }
        kept
    }
}

/// Animation names and font declarations referenced by surviving style rules.
#[derive(Debug, Default)]
struct AtRuleUsage {
    animation_words: HashSet<String>,
    /// Lowercased comma-separated segments of `font`/`font-family` values.
    font_segments: Vec<String>,
}

impl AtRuleUsage {
    fn collect(rules: &[OwnedRule]) -> Self {
        let mut usage = AtRuleUsage::default();
        usage.visit(rules);
        usage
    }

    fn visit(&mut self, rules: &[OwnedRule]) {
        for rule in rules {
            match rule {
                OwnedRule::Style(style) => {
                    for decl in style.declarations_of(&["animation", "animation-name"]) {
                        self.animation_words.extend(
                            decl.value
                                .split(|c: char| c.is_whitespace() || c == ',')
                                .filter(|w| !w.is_empty())
                                .map(|w| w.trim_matches(|c| c == '"' || c == '\'').to_string()),
                        );
                    }
                    for decl in style.declarations_of(&["font", "font-family"]) {
                        self.font_segments.extend(
                            decl.value
                                .to_lowercase()
                                .split(',')
                                .map(|segment| segment.trim().to_string()),
                        );
                    }
                    self.visit(&style.rules);
                }
                OwnedRule::Group(group) => self.visit(&group.rules),
                _ => {}
            }
        }
    }

    fn animates(&self, name: &str) -> bool {
        self.animation_words.contains(name)
    }

    fn uses_font(&self, family: &Option<String>) -> bool {
        match family {
            Some(family) => {
                let family = family.to_lowercase();
                self.font_segments
                    .iter()
                    .any(|segment| names_family(segment, &family))
            }
            None => true,
        }
    }
}

/// Whether one segment of a font value names `family`. The `font` shorthand
/// puts size and style words before the first family, so only the tail of the
/// segment has to match, on a word boundary.
fn names_family(segment: &str, family: &str) -> bool {
    let segment = segment.trim_end_matches(['"', '\'']);
    match segment.strip_suffix(family) {
        Some(rest) => rest.is_empty() || rest.ends_with([' ', '"', '\'']),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::owned_css::{
        OwnedDeclaration, OwnedFontFace, OwnedGroupRule, OwnedKeyframes,
    };
    use pretty_assertions::assert_eq;

    fn style(selectors: &[&str], declarations: &[(&str, &str)]) -> OwnedRule {
        OwnedRule::Style(OwnedStyleRule {
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            declarations: declarations
                .iter()
                .map(|(p, v)| OwnedDeclaration {
                    property: p.to_string(),
                    value: v.to_string(),
                    important: false,
                })
                .collect(),
            rules: vec![],
        })
    }

    fn selectors_of(sheet: &OwnedStylesheet) -> Vec<String> {
        sheet
            .rules
            .iter()
            .filter_map(|r| match r {
                OwnedRule::Style(s) => Some(s.selectors.join(", ")),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_code_block_example() {
        let tokens: TokenSet = ["code-block", "btn"].into_iter().collect();
        let whitelist = Whitelist::compile::<&str>(&[], &[], &["/^code-block$/"]).unwrap();
        let sheet = OwnedStylesheet {
            rules: vec![
                style(&[".code-block"], &[]),
                style(&[".btn"], &[]),
                style(&[".unused"], &[]),
                style(&[".code-block__child"], &[]),
            ],
        };

        let outcome = SelectorPruner::new(&tokens, &whitelist).prune(&sheet);

        assert_eq!(
            selectors_of(&outcome.stylesheet),
            vec![".code-block", ".btn", ".code-block__child"]
        );
        assert_eq!(outcome.rejected, vec![".unused"]);
    }

    #[test]
    fn test_whitelisted_rule_survives_without_tokens() {
        let tokens = TokenSet::new();
        let whitelist = Whitelist::compile::<&str>(&[], &["^modal"], &[]).unwrap();
        let pruner = SelectorPruner::new(&tokens, &whitelist);

        assert!(pruner.keep_branch(".modal-backdrop"));
        assert!(!pruner.keep_branch(".tooltip"));
    }

    #[test]
    fn test_plain_whitelist_names() {
        let tokens = TokenSet::new();
        let whitelist = Whitelist::compile(&["active"], &[], &[]).unwrap();
        let pruner = SelectorPruner::new(&tokens, &whitelist);
        assert!(pruner.keep_branch(".tab.active"));
        assert!(!pruner.keep_branch(".tab"));
    }

    #[test]
    fn test_selector_equal_to_token_is_kept() {
        let tokens: TokenSet = [".btn", "#main"].into_iter().collect();
        let whitelist = Whitelist::new();
        let sheet = OwnedStylesheet {
            rules: vec![
                style(&[".btn"], &[]),
                style(&["#main"], &[]),
                style(&[".other"], &[]),
            ],
        };

        let outcome = SelectorPruner::new(&tokens, &whitelist).prune(&sheet);
        assert_eq!(selectors_of(&outcome.stylesheet), vec![".btn", "#main"]);
        assert_eq!(outcome.rejected, vec![".other"]);
    }

    #[test]
    fn test_font_family_matches_whole_names() {
        let tokens: TokenSet = ["title", "body"].into_iter().collect();
        let whitelist = Whitelist::new();
        let face = |family: &str| {
            OwnedRule::FontFace(OwnedFontFace {
                family: Some(family.into()),
                css: "@font-face {}".into(),
            })
        };
        let sheet = OwnedStylesheet {
            rules: vec![
                style(&[".title"], &[("font-family", "Interstate, sans-serif")]),
                style(&[".body"], &[("font", "italic 12px/1.5 \"Fira Code\", monospace")]),
                face("Inter"),
                face("Interstate"),
                face("Fira Code"),
            ],
        };

        let outcome = SelectorPruner::new(&tokens, &whitelist)
            .with_options(PruneOptions {
                keyframes: false,
                font_face: true,
            })
            .prune(&sheet);
        assert_eq!(outcome.rejected, vec!["@font-face Inter"]);
        assert_eq!(outcome.stylesheet.rules.len(), 4);
    }

    #[test]
    fn test_structural_selectors_always_kept() {
        let tokens = TokenSet::new();
        let whitelist = Whitelist::new();
        let pruner = SelectorPruner::new(&tokens, &whitelist);
        for selector in ["*", ":root", "::selection", "& > *"] {
            assert!(pruner.keep_branch(selector), "{selector} was dropped");
        }
    }

    #[test]
    fn test_per_branch_pruning_keeps_order() {
        let tokens: TokenSet = ["a", "c"].into_iter().collect();
        let whitelist = Whitelist::new();
        let sheet = OwnedStylesheet {
            rules: vec![
                style(&[".c"], &[("color", "red")]),
                style(&[".a", ".b", ".c"], &[("display", "none")]),
                style(&[".b"], &[]),
            ],
        };

        let pruner = SelectorPruner::new(&tokens, &whitelist);
        assert_eq!(
            pruner.decide(&[".a".into(), ".b".into(), ".c".into()]),
            PruneDecision {
                branches: vec![true, false, true]
            }
        );

        let outcome = pruner.prune(&sheet);
        assert_eq!(selectors_of(&outcome.stylesheet), vec![".c", ".a, .c"]);
        assert_eq!(outcome.rejected, vec![".b", ".b"]);
    }

    #[test]
    fn test_pruning_is_idempotent() {
        let tokens: TokenSet = ["btn", "nav"].into_iter().collect();
        let whitelist = Whitelist::compile::<&str>(&[], &[], &["^code-block$"]).unwrap();
        let sheet = OwnedStylesheet {
            rules: vec![
                style(&[".btn", ".gone"], &[]),
                OwnedRule::Group(OwnedGroupRule {
                    prelude: "@media print".into(),
                    rules: vec![style(&["nav a"], &[]), style(&[".gone"], &[])],
                }),
                style(&[".code-block__x"], &[]),
            ],
        };

        let pruner = SelectorPruner::new(&tokens, &whitelist);
        let once = pruner.prune(&sheet);
        let twice = pruner.prune(&once.stylesheet);

        assert_eq!(once.stylesheet, twice.stylesheet);
        assert!(twice.rejected.is_empty());
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        let tokens = TokenSet::new();
        let whitelist = Whitelist::new();
        let sheet = OwnedStylesheet {
            rules: vec![OwnedRule::Group(OwnedGroupRule {
                prelude: "@media print".into(),
                rules: vec![style(&[".gone"], &[])],
            })],
        };

        let outcome = SelectorPruner::new(&tokens, &whitelist).prune(&sheet);
        assert!(outcome.stylesheet.rules.is_empty());
    }

    #[test]
    fn test_unused_keyframes_and_font_faces() {
        let tokens: TokenSet = ["spinner"].into_iter().collect();
        let whitelist = Whitelist::new();
        let sheet = OwnedStylesheet {
            rules: vec![
                style(
                    &[".spinner"],
                    &[("animation", "1s linear infinite spin"), ("font-family", "Inter, sans-serif")],
                ),
                style(&[".fader"], &[("animation-name", "fade")]),
                OwnedRule::Keyframes(OwnedKeyframes {
                    name: "spin".into(),
                    css: "@keyframes spin {}".into(),
                }),
                OwnedRule::Keyframes(OwnedKeyframes {
                    name: "fade".into(),
                    css: "@keyframes fade {}".into(),
                }),
                OwnedRule::FontFace(OwnedFontFace {
                    family: Some("Inter".into()),
                    css: "@font-face {}".into(),
                }),
                OwnedRule::FontFace(OwnedFontFace {
                    family: Some("Fira Code".into()),
                    css: "@font-face {}".into(),
                }),
            ],
        };

        let without = SelectorPruner::new(&tokens, &whitelist).prune(&sheet);
        assert_eq!(without.stylesheet.rules.len(), 5);

        let with = SelectorPruner::new(&tokens, &whitelist)
            .with_options(PruneOptions {
                keyframes: true,
                font_face: true,
            })
            .prune(&sheet);
        assert_eq!(with.stylesheet.rules.len(), 3);
        assert_eq!(
            with.rejected,
            vec![".fader", "@keyframes fade", "@font-face Fira Code"]
        );
    }
}
