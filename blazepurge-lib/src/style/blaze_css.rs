use crate::error::{PurgeError, Result};
use crate::style::owned_css::{
    OwnedDeclaration, OwnedFontFace, OwnedGroupRule, OwnedKeyframes, OwnedRule, OwnedStyleRule,
    OwnedStylesheet,
};
use lightningcss::printer::PrinterOptions;
use lightningcss::properties::Property;
use lightningcss::rules::{style::StyleRule, CssRule};
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use lightningcss::traits::ToCss;

/// Parse a raw CSS string (LightningCSS) and convert it to a fully-owned stylesheet.
///
/// `origin` names the source in error messages (a path, or `<raw>`).
pub fn parse_stylesheet(css_text: &str, origin: &str) -> Result<OwnedStylesheet> {
    let sheet = LightningStyleSheet::parse(css_text, ParserOptions::default()).map_err(|e| {
        PurgeError::CssParse {
            origin: origin.to_string(),
            message: e.to_string(),
        }
    })?;

    let rules = convert_rules(&sheet.rules.0, origin)?;
    Ok(OwnedStylesheet { rules })
}

fn convert_rules(rules: &[CssRule<'_>], origin: &str) -> Result<Vec<OwnedRule>> {
    let mut owned_rules = Vec::with_capacity(rules.len());

    for rule in rules {
        let owned = match rule {
            CssRule::Style(style_rule) => OwnedRule::Style(convert_style_rule(style_rule, origin)?),
            CssRule::Media(media_rule) => OwnedRule::Group(OwnedGroupRule {
                prelude: format!("@media {}", print(&media_rule.query, origin)?),
                rules: convert_rules(&media_rule.rules.0, origin)?,
            }),
            CssRule::Supports(supports_rule) => OwnedRule::Group(OwnedGroupRule {
                prelude: format!("@supports {}", print(&supports_rule.condition, origin)?),
                rules: convert_rules(&supports_rule.rules.0, origin)?,
            }),
            CssRule::LayerBlock(layer_rule) => group_rule(rule, &layer_rule.rules.0, origin)?,
            CssRule::Container(container_rule) => {
                group_rule(rule, &container_rule.rules.0, origin)?
            }
            CssRule::Scope(scope_rule) => group_rule(rule, &scope_rule.rules.0, origin)?,
            CssRule::StartingStyle(starting_rule) => {
                group_rule(rule, &starting_rule.rules.0, origin)?
            }
            CssRule::MozDocument(document_rule) => {
                group_rule(rule, &document_rule.rules.0, origin)?
            }
            CssRule::Nesting(nesting_rule) => {
                OwnedRule::Style(convert_style_rule(&nesting_rule.style, origin)?)
            }
            CssRule::Keyframes(_) => {
                let css = print(rule, origin)?;
                match keyframes_name(&css) {
                    Some(name) => OwnedRule::Keyframes(OwnedKeyframes { name, css }),
                    None => OwnedRule::Raw(css),
                }
            }
            CssRule::FontFace(_) => {
                let css = print(rule, origin)?;
                OwnedRule::FontFace(OwnedFontFace {
                    family: font_face_family(&css),
                    css,
                })
            }
            CssRule::Ignored => continue,
            _ => OwnedRule::Raw(print(rule, origin)?),
        };
        owned_rules.push(owned);
    }

    Ok(owned_rules)
}

/// A grouping at-rule whose prelude has no typed printer of its own here; the
/// prelude is whatever precedes the block in the printed rule.
fn group_rule(rule: &CssRule<'_>, rules: &[CssRule<'_>], origin: &str) -> Result<OwnedRule> {
    let css = print(rule, origin)?;
    let prelude = css.split('{').next().unwrap_or_default().trim_end();
    Ok(OwnedRule::Group(OwnedGroupRule {
        prelude: prelude.to_string(),
        rules: convert_rules(rules, origin)?,
    }))
}

/// Copy a single StyleRule's selectors + declarations (and nested rules) into an OwnedStyleRule.
fn convert_style_rule(style_rule: &StyleRule<'_>, origin: &str) -> Result<OwnedStyleRule> {
    let mut selectors = Vec::with_capacity(style_rule.selectors.0.len());
    for selector in &style_rule.selectors.0 {
        selectors.push(print(selector, origin)?);
    }

    let block = &style_rule.declarations;
    let mut declarations =
        Vec::with_capacity(block.declarations.len() + block.important_declarations.len());

    for property in &block.declarations {
        declarations.push(convert_declaration(property, false, origin)?);
    }
    for property in &block.important_declarations {
        declarations.push(convert_declaration(property, true, origin)?);
    }

    Ok(OwnedStyleRule {
        selectors,
        declarations,
        rules: convert_rules(&style_rule.rules.0, origin)?,
    })
}

fn convert_declaration(
    property: &Property<'_>,
    important: bool,
    origin: &str,
) -> Result<OwnedDeclaration> {
    // Printed whole so vendor prefixes and custom property names survive.
    let printed = property
        .to_css_string(false, PrinterOptions::default())
        .map_err(|e| print_error(e, origin))?;
    let (name, value) = printed
        .split_once(':')
        .ok_or_else(|| print_error(format!("malformed declaration `{}`", printed), origin))?;
    Ok(OwnedDeclaration {
        property: name.trim().to_string(),
        value: value.trim().to_string(),
        important,
    })
}

fn print<T: ToCss>(value: &T, origin: &str) -> Result<String> {
    value
        .to_css_string(PrinterOptions::default())
        .map_err(|e| print_error(e, origin))
}

fn print_error(e: impl std::fmt::Display, origin: &str) -> PurgeError {
    PurgeError::CssPrint {
        origin: origin.to_string(),
        message: e.to_string(),
    }
}

/// Name of a printed `@keyframes` (or vendor-prefixed) rule.
fn keyframes_name(css: &str) -> Option<String> {
    let rest = css.trim_start().strip_prefix('@')?;
    let (keyword, rest) = rest.split_once(char::is_whitespace)?;
    if !keyword.ends_with("keyframes") {
        return None;
    }
    let name = rest.split('{').next()?.trim();
    let name = name.trim_matches(|c| c == '"' || c == '\'');
    (!name.is_empty()).then(|| name.to_string())
}

/// First family named by a printed `@font-face` rule.
fn font_face_family(css: &str) -> Option<String> {
    let start = css.find("font-family")? + "font-family".len();
    let value = css[start..].trim_start().strip_prefix(':')?;
    let end = value.find([';', '}']).unwrap_or(value.len());
    let family = value[..end]
        .split(',')
        .next()?
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');
    (!family.is_empty()).then(|| family.to_string())
}
