use std::collections::hash_set;
use std::collections::HashSet;

/// The set of tokens observed across all scanned content.
///
/// Built by union (per file, then merged) and read-only afterwards. Union is
/// commutative and associative, so the order files are scanned in does not
/// matter.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenSet {
    tokens: HashSet<String>,
}

impl TokenSet {
    pub fn new() -> Self {
        TokenSet {
            tokens: HashSet::new(),
        }
    }

    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        self.tokens.insert(token.into())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, String> {
        self.tokens.iter()
    }

    /// Merge two sets, draining the smaller one into the larger.
    pub fn union(self, other: TokenSet) -> TokenSet {
        let (mut large, small) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        large.tokens.extend(small.tokens);
        large
    }
}

impl<S: Into<String>> FromIterator<S> for TokenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        TokenSet {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for TokenSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.tokens.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for TokenSet {
    type Item = String;
    type IntoIter = hash_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_is_order_independent() {
        let a: TokenSet = ["btn", "code-block"].into_iter().collect();
        let b: TokenSet = ["btn", "hover:bg-red"].into_iter().collect();

        let ab = a.clone().union(b.clone());
        let ba = b.union(a);

        assert_eq!(ab, ba);
        assert_eq!(ab.len(), 3);
        assert!(ab.contains("hover:bg-red"));
    }

    #[test]
    fn test_contains_is_case_sensitive() {
        let set: TokenSet = ["Btn"].into_iter().collect();
        assert!(set.contains("Btn"));
        assert!(!set.contains("btn"));
    }
}
