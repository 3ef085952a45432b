//! Token extraction: turning raw content text into candidate selector names.
//!
//! Each extractor is a pure function of its input text. Extractors are bound to
//! file extensions through an [`ExtractorRegistry`]; anything unbound falls back
//! to the [`DefaultExtractor`].

pub mod blaze_default;
pub mod blaze_html;

pub use blaze_default::{tokens, DefaultExtractor, Tokens};
pub use blaze_html::HtmlExtractor;

use crate::error::{PurgeError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Maps the text of one content file to the tokens it may use as selectors.
pub trait TokenExtractor: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// All tokens in `content`, in scan order. Duplicates are allowed.
    fn extract(&self, content: &str) -> Vec<String>;
}

/// Every non-overlapping match of a user pattern is a token.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    pattern: Regex,
}

impl RegexExtractor {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| PurgeError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(RegexExtractor { pattern })
    }
}

impl TokenExtractor for RegexExtractor {
    fn name(&self) -> &str {
        "regex"
    }

    fn extract(&self, content: &str) -> Vec<String> {
        self.pattern
            .find_iter(content)
            .filter(|m| !m.as_str().is_empty())
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Extractors keyed by lowercase file extension (no leading dot).
#[derive(Clone)]
pub struct ExtractorRegistry {
    by_extension: HashMap<String, Arc<dyn TokenExtractor>>,
    fallback: Arc<dyn TokenExtractor>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        ExtractorRegistry {
            by_extension: HashMap::new(),
            fallback: Arc::new(DefaultExtractor),
        }
    }

    /// Bind `extractor` to every extension in `extensions`. Later bindings win.
    pub fn register<I, S>(&mut self, extractor: Arc<dyn TokenExtractor>, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            self.by_extension
                .insert(normalize_extension(ext.as_ref()), Arc::clone(&extractor));
        }
    }

    pub fn for_extension(&self, extension: &str) -> &dyn TokenExtractor {
        self.by_extension
            .get(&normalize_extension(extension))
            .map(|e| &**e)
            .unwrap_or_else(|| &*self.fallback)
    }

    pub fn for_path(&self, path: &Path) -> &dyn TokenExtractor {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.for_extension(ext)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut bindings: Vec<_> = self
            .by_extension
            .iter()
            .map(|(ext, e)| (ext.as_str(), e.name()))
            .collect();
        bindings.sort();
        f.debug_struct("ExtractorRegistry")
            .field("bindings", &bindings)
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}
