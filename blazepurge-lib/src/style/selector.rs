//! Decomposition of a selector branch into the simple-selector names the pruner
//! compares against content tokens.
//!
//! The input is the canonical text lightningcss prints for one branch of a
//! selector list (e.g. `div.card > .hover\:bg-red:hover`). Combinators,
//! universal selectors and the nesting selector contribute nothing; CSS escapes
//! are decoded so names compare equal to the raw text found in content.

/// What kind of simple selector a name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Tag,
    Class,
    Id,
    /// `[name]`
    Attribute,
    /// `[name="value"]`
    AttributeValue,
    PseudoClass,
    PseudoElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleName {
    pub kind: NameKind,
    pub value: String,
}

impl SimpleName {
    fn new(kind: NameKind, value: String) -> Self {
        SimpleName { kind, value }
    }

    /// Pseudo-classes and pseudo-elements describe state, not markup.
    pub fn is_pseudo(&self) -> bool {
        matches!(self.kind, NameKind::PseudoClass | NameKind::PseudoElement)
    }
}

/// Pseudo-classes whose arguments are selectors that must themselves be present.
const FORWARDING_PSEUDO_CLASSES: &[&str] = &[
    "is",
    "where",
    "has",
    "matches",
    "any",
    "-webkit-any",
    "-moz-any",
];

/// Break one selector branch into its constituent names, in source order.
pub fn decompose(selector: &str) -> Vec<SimpleName> {
    let chars: Vec<char> = selector.chars().collect();
    let mut names = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '.' => {
                i += 1;
                let class = read_ident(&chars, &mut i);
                if !class.is_empty() {
                    names.push(SimpleName::new(NameKind::Class, class));
                }
            }
            '#' => {
                i += 1;
                let id = read_ident(&chars, &mut i);
                if !id.is_empty() {
                    names.push(SimpleName::new(NameKind::Id, id));
                }
            }
            '[' => {
                i += 1;
                read_attribute(&chars, &mut i, &mut names);
            }
            ':' => {
                i += 1;
                let kind = if chars.get(i) == Some(&':') {
                    i += 1;
                    NameKind::PseudoElement
                } else {
                    NameKind::PseudoClass
                };
                let name = read_ident(&chars, &mut i);
                if chars.get(i) == Some(&'(') {
                    i += 1;
                    let args = read_balanced(&chars, &mut i);
                    let lower = name.to_ascii_lowercase();
                    if kind == NameKind::PseudoClass
                        && FORWARDING_PSEUDO_CLASSES.contains(&lower.as_str())
                    {
                        names.extend(decompose(&args));
                    }
                }
                if !name.is_empty() {
                    names.push(SimpleName::new(kind, name));
                }
            }
            c if is_ident_start(c) => {
                let tag = read_ident(&chars, &mut i);
                if chars.get(i) == Some(&'|') && chars.get(i + 1) != Some(&'=') {
                    // `ns|tag`: the prefix is a namespace, not an element.
                    i += 1;
                    continue;
                }
                if !tag.is_empty() {
                    names.push(SimpleName::new(NameKind::Tag, tag));
                }
            }
            // Combinators, `*`, `&`, `|` and whitespace carry no names.
            _ => i += 1,
        }
    }

    names
}

/// The BEM block of a class name: everything before the first `__` or `--`.
///
/// `code-block__child` and `code-block--dark` both have block `code-block`;
/// names without a separator (or starting with one) have no block.
pub fn bem_block(name: &str) -> Option<&str> {
    let cut = [name.find("__"), name.find("--")]
        .into_iter()
        .flatten()
        .min()?;
    (cut > 0).then(|| &name[..cut])
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '-' || ch == '\\' || !ch.is_ascii()
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-' || !ch.is_ascii()
}

/// Read an identifier starting at `*i`, decoding escapes. Leaves `*i` on the
/// first character that is not part of it.
fn read_ident(chars: &[char], i: &mut usize) -> String {
    let mut ident = String::new();
    while let Some(&ch) = chars.get(*i) {
        if ch == '\\' {
            *i += 1;
            if let Some(decoded) = read_escape(chars, i) {
                ident.push(decoded);
            }
        } else if is_ident_char(ch) {
            ident.push(ch);
            *i += 1;
        } else {
            break;
        }
    }
    ident
}

/// Decode the escape whose backslash was just consumed.
fn read_escape(chars: &[char], i: &mut usize) -> Option<char> {
    let first = *chars.get(*i)?;
    if !first.is_ascii_hexdigit() {
        *i += 1;
        return Some(first);
    }

    let mut code = 0u32;
    let mut digits = 0;
    while digits < 6 {
        match chars.get(*i).and_then(|c| c.to_digit(16)) {
            Some(d) => {
                code = code * 16 + d;
                digits += 1;
                *i += 1;
            }
            None => break,
        }
    }
    // A single whitespace terminates a hex escape and belongs to it.
    if chars.get(*i).is_some_and(|c| c.is_whitespace()) {
        *i += 1;
    }
    Some(
        char::from_u32(code)
            .filter(|&c| c != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER),
    )
}

/// Parse the body of `[...]` (opening bracket already consumed).
fn read_attribute(chars: &[char], i: &mut usize, names: &mut Vec<SimpleName>) {
    skip_whitespace(chars, i);
    let mut name = read_ident(chars, i);
    // Namespaced attribute: `[xlink|href]`.
    if chars.get(*i) == Some(&'|') && chars.get(*i + 1) != Some(&'=') {
        *i += 1;
        name = read_ident(chars, i);
    }
    skip_whitespace(chars, i);

    let mut value = String::new();
    if let Some(&ch) = chars.get(*i) {
        if matches!(ch, '~' | '|' | '^' | '$' | '*') {
            *i += 1;
        }
        if chars.get(*i) == Some(&'=') {
            *i += 1;
            skip_whitespace(chars, i);
            value = match chars.get(*i) {
                Some(&q) if q == '"' || q == '\'' => {
                    *i += 1;
                    read_quoted(chars, i, q)
                }
                _ => read_ident(chars, i),
            };
        }
    }

    // Skip flags (` i`, ` s`) up to the closing bracket.
    while let Some(&ch) = chars.get(*i) {
        *i += 1;
        if ch == ']' {
            break;
        }
    }

    if !name.is_empty() {
        names.push(SimpleName::new(NameKind::Attribute, name));
    }
    if !value.is_empty() {
        names.push(SimpleName::new(NameKind::AttributeValue, value));
    }
}

fn read_quoted(chars: &[char], i: &mut usize, quote: char) -> String {
    let mut value = String::new();
    while let Some(&ch) = chars.get(*i) {
        *i += 1;
        if ch == quote {
            break;
        }
        if ch == '\\' {
            if let Some(decoded) = read_escape(chars, i) {
                value.push(decoded);
            }
        } else {
            value.push(ch);
        }
    }
    value
}

/// Read up to the `)` matching an already-consumed `(`, returning the inside.
fn read_balanced(chars: &[char], i: &mut usize) -> String {
    let mut depth = 1;
    let mut inner = String::new();
    let mut quote: Option<char> = None;

    while let Some(&ch) = chars.get(*i) {
        *i += 1;
        match quote {
            Some(q) => {
                if ch == '\\' {
                    inner.push(ch);
                    if let Some(&next) = chars.get(*i) {
                        inner.push(next);
                        *i += 1;
                    }
                    continue;
                }
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '\\' => {
                    inner.push(ch);
                    if let Some(&next) = chars.get(*i) {
                        inner.push(next);
                        *i += 1;
                    }
                    continue;
                }
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            },
        }
        inner.push(ch);
    }
    inner
}

fn skip_whitespace(chars: &[char], i: &mut usize) {
    while chars.get(*i).is_some_and(|c| c.is_whitespace()) {
        *i += 1;
    }
}
