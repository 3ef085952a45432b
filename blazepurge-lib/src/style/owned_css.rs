// A fully-owned stylesheet: what the pruner reads and what gets printed back out.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OwnedStylesheet {
    pub rules: Vec<OwnedRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OwnedRule {
    Style(OwnedStyleRule),
    /// `@media` / `@supports`: a prelude wrapping nested rules.
    Group(OwnedGroupRule),
    Keyframes(OwnedKeyframes),
    FontFace(OwnedFontFace),
    /// Any other at-rule, kept verbatim.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedStyleRule {
    /// One entry per comma-separated branch, e.g. ".btn", "div > .red".
    pub selectors: Vec<String>,
    pub declarations: Vec<OwnedDeclaration>,
    /// Nested style rules (CSS nesting).
    pub rules: Vec<OwnedRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedDeclaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedGroupRule {
    /// e.g. "@media (max-width: 600px)".
    pub prelude: String,
    pub rules: Vec<OwnedRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedKeyframes {
    pub name: String,
    pub css: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedFontFace {
    pub family: Option<String>,
    pub css: String,
}

impl OwnedStyleRule {
    pub fn declarations_of<'a>(
        &'a self,
        properties: &'a [&'a str],
    ) -> impl Iterator<Item = &'a OwnedDeclaration> + 'a {
        self.declarations
            .iter()
            .filter(move |d| properties.iter().any(|p| d.property.eq_ignore_ascii_case(p)))
    }
}

impl OwnedStylesheet {
    /// Number of style rules, including those nested in groups.
    pub fn style_rule_count(&self) -> usize {
        fn count(rules: &[OwnedRule]) -> usize {
            rules
                .iter()
                .map(|rule| match rule {
                    OwnedRule::Style(style) => 1 + count(&style.rules),
                    OwnedRule::Group(group) => count(&group.rules),
                    _ => 0,
                })
                .sum()
        }
        count(&self.rules)
    }
}

impl fmt::Display for OwnedStylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rules(f, &self.rules, 0)
    }
}

impl fmt::Display for OwnedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rule(f, self, 0)
    }
}

fn write_rules(f: &mut fmt::Formatter<'_>, rules: &[OwnedRule], depth: usize) -> fmt::Result {
    for (i, rule) in rules.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        write_rule(f, rule, depth)?;
    }
    Ok(())
}

fn write_rule(f: &mut fmt::Formatter<'_>, rule: &OwnedRule, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    match rule {
        OwnedRule::Style(style) => {
            writeln!(f, "{}{} {{", indent, style.selectors.join(", "))?;
            for decl in &style.declarations {
                let bang = if decl.important { " !important" } else { "" };
                writeln!(f, "{}  {}: {}{};", indent, decl.property, decl.value, bang)?;
            }
            if !style.rules.is_empty() {
                if !style.declarations.is_empty() {
                    writeln!(f)?;
                }
                write_rules(f, &style.rules, depth + 1)?;
            }
            writeln!(f, "{}}}", indent)
        }
        OwnedRule::Group(group) => {
            writeln!(f, "{}{} {{", indent, group.prelude)?;
            write_rules(f, &group.rules, depth + 1)?;
            writeln!(f, "{}}}", indent)
        }
        OwnedRule::Keyframes(OwnedKeyframes { css, .. })
        | OwnedRule::FontFace(OwnedFontFace { css, .. })
        | OwnedRule::Raw(css) => write_verbatim(f, css, &indent),
    }
}

fn write_verbatim(f: &mut fmt::Formatter<'_>, css: &str, indent: &str) -> fmt::Result {
    for line in css.trim_end().lines() {
        writeln!(f, "{}{}", indent, line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decl(property: &str, value: &str) -> OwnedDeclaration {
        OwnedDeclaration {
            property: property.to_string(),
            value: value.to_string(),
            important: false,
        }
    }

    #[test]
    fn test_print_style_and_group() {
        let sheet = OwnedStylesheet {
            rules: vec![
                OwnedRule::Style(OwnedStyleRule {
                    selectors: vec![".a".into(), ".b".into()],
                    declarations: vec![
                        decl("color", "red"),
                        OwnedDeclaration {
                            important: true,
                            ..decl("display", "block")
                        },
                    ],
                    rules: vec![],
                }),
                OwnedRule::Group(OwnedGroupRule {
                    prelude: "@media print".into(),
                    rules: vec![OwnedRule::Style(OwnedStyleRule {
                        selectors: vec![".a".into()],
                        declarations: vec![decl("display", "none")],
                        rules: vec![],
                    })],
                }),
            ],
        };

        let expected = "\
.a, .b {
  color: red;
  display: block !important;
}

@media print {
  .a {
    display: none;
  }
}
";
        assert_eq!(sheet.to_string(), expected);
        assert_eq!(sheet.style_rule_count(), 2);
    }
}
