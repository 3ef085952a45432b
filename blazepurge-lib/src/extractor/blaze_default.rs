//! The default lexical extractor.
//!
//! A token is a maximal run of ASCII letters, digits, `-`, `:` and `/`. This
//! keeps utility class names such as `hover:bg-red-500` or `w-1/2` in one
//! piece. No syntax of the scanned language is interpreted.

use super::TokenExtractor;

/// True for characters that may appear inside a token.
#[inline]
pub fn is_token_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == ':' || ch == '/'
}

/// Lazily scan `content` for tokens, left to right, greedy and non-overlapping.
///
/// The returned iterator is cheap to clone; a clone resumes from the same
/// position, and calling `tokens` again restarts the scan.
pub fn tokens(content: &str) -> Tokens<'_> {
    Tokens { rest: content }
}

/// Iterator over the tokens of a string slice.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        // Token chars are all ASCII, so byte offsets from these searches are
        // always on char boundaries.
        let start = self.rest.find(is_token_char)?;
        let tail = &self.rest[start..];
        let len = tail.find(|c: char| !is_token_char(c)).unwrap_or(tail.len());
        let (token, rest) = tail.split_at(len);
        self.rest = rest;
        Some(token)
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExtractor;

impl TokenExtractor for DefaultExtractor {
    fn name(&self) -> &str {
        "default"
    }

    fn extract(&self, content: &str) -> Vec<String> {
        tokens(content).map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_nothing() {
        assert_eq!(tokens("").count(), 0);
        assert_eq!(tokens("  ;{}()  ").count(), 0);
    }

    #[test]
    fn test_utility_classes_stay_whole() {
        let js = r#"el.classList.add("hover:bg-red-500", 'w-1/2');"#;
        let found: Vec<&str> = tokens(js).collect();
        assert_eq!(
            found,
            vec!["el", "classList", "add", "hover:bg-red-500", "w-1/2"]
        );
    }

    #[test]
    fn test_single_character_tokens() {
        let found: Vec<&str> = tokens("a b_c").collect();
        assert_eq!(found, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_underscore_and_dot_split_tokens() {
        let found: Vec<&str> = tokens("code-block__child.is-open").collect();
        assert_eq!(found, vec!["code-block", "child", "is-open"]);
    }

    #[test]
    fn test_non_ascii_letters_are_separators() {
        let found: Vec<&str> = tokens("été-x").collect();
        assert_eq!(found, vec!["t", "-x"]);
    }

    #[test]
    fn test_restartable_by_clone() {
        let mut iter = tokens("one two three");
        assert_eq!(iter.next(), Some("one"));
        let snapshot = iter.clone();
        assert_eq!(iter.collect::<Vec<_>>(), vec!["two", "three"]);
        assert_eq!(snapshot.collect::<Vec<_>>(), vec!["two", "three"]);
    }

    #[test]
    fn test_separators_reconstruct_input() {
        let input = "<div class=\"card p-4 md:flex\">{x / 2}</div>\n";
        let mut rebuilt = String::new();
        let mut cursor = 0;
        for token in tokens(input) {
            assert!(token.chars().all(is_token_char), "leaked char in {token:?}");
            let offset = input[cursor..].find(token).unwrap() + cursor;
            let gap = &input[cursor..offset];
            assert!(!gap.chars().any(is_token_char), "skipped token chars in {gap:?}");
            rebuilt.push_str(gap);
            rebuilt.push_str(token);
            cursor = offset + token.len();
        }
        rebuilt.push_str(&input[cursor..]);
        assert_eq!(rebuilt, input);
    }
}
