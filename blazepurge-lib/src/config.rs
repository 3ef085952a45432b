//! Purge configuration.
//!
//! [`PurgeConfig`] mirrors the JSON file a project keeps next to its sources:
//!
//! ```json
//! {
//!   "content": ["src/**/*.js"],
//!   "css": ["src/index.css"],
//!   "extractors": [
//!     { "extractor": { "pattern": "[A-z0-9\\-:/]+" }, "extensions": ["js"] }
//!   ],
//!   "whitelistPatternsChildren": ["/^code-block$/"]
//! }
//! ```
//!
//! It is compiled once into [`PurgeOptions`]: globs expanded, regexes compiled
//! and extractors bound. Every configuration error surfaces there, before any
//! content is read.

use crate::error::{PurgeError, Result};
use crate::extractor::{
    DefaultExtractor, ExtractorRegistry, HtmlExtractor, RegexExtractor, TokenExtractor,
};
use crate::style::{PruneOptions, Whitelist};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PurgeConfig {
    /// Files (or inline text) scanned for tokens.
    #[serde(default)]
    pub content: Vec<ContentSource>,
    /// Stylesheets to purge.
    #[serde(default)]
    pub css: Vec<CssSource>,
    #[serde(default)]
    pub extractors: Vec<ExtractorBinding>,
    /// Names always treated as used.
    #[serde(default)]
    pub whitelist: Vec<String>,
    /// Patterns protecting matching rules.
    #[serde(default)]
    pub whitelist_patterns: Vec<String>,
    /// Patterns protecting matching rules and their children.
    #[serde(default)]
    pub whitelist_patterns_children: Vec<String>,
    #[serde(default)]
    pub keyframes: bool,
    #[serde(default)]
    pub font_face: bool,
    /// Report removed selectors.
    #[serde(default)]
    pub rejected: bool,
    /// A `.css` file (single stylesheet) or a directory.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ContentSource {
    Glob(String),
    Raw { raw: String, extension: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CssSource {
    Glob(String),
    Raw { raw: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ExtractorBinding {
    pub extractor: ExtractorKind,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ExtractorKind {
    Builtin(BuiltinExtractor),
    Pattern { pattern: String },
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinExtractor {
    Default,
    Html,
}

impl ExtractorKind {
    fn build(&self) -> Result<Arc<dyn TokenExtractor>> {
        let extractor: Arc<dyn TokenExtractor> = match self {
            ExtractorKind::Builtin(BuiltinExtractor::Default) => Arc::new(DefaultExtractor),
            ExtractorKind::Builtin(BuiltinExtractor::Html) => Arc::new(HtmlExtractor),
            ExtractorKind::Pattern { pattern } => Arc::new(RegexExtractor::new(pattern)?),
        };
        Ok(extractor)
    }
}

/// One input the extractors will read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentInput {
    File(PathBuf),
    Raw { raw: String, extension: String },
}

/// One stylesheet to purge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CssInput {
    File(PathBuf),
    Raw(String),
}

impl CssInput {
    /// How the input is named in logs and errors.
    pub fn origin(&self) -> String {
        match self {
            CssInput::File(path) => path.display().to_string(),
            CssInput::Raw(_) => "<raw>".to_string(),
        }
    }
}

/// Compiled, immutable options for one purge run.
#[derive(Debug, Clone)]
pub struct PurgeOptions {
    pub content: Vec<ContentInput>,
    pub css: Vec<CssInput>,
    pub extractors: ExtractorRegistry,
    pub whitelist: Whitelist,
    pub prune: PruneOptions,
    pub rejected: bool,
    pub output: Option<PathBuf>,
}

impl PurgeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| PurgeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Validate the configuration and build the options the engine runs with.
    ///
    /// Relative globs resolve against the working directory.
    pub fn compile(&self) -> Result<PurgeOptions> {
        if self.content.is_empty() {
            return Err(PurgeError::Config("no content sources given".to_string()));
        }
        if self.css.is_empty() {
            return Err(PurgeError::Config("no css sources given".to_string()));
        }

        let whitelist = Whitelist::compile(
            &self.whitelist,
            &self.whitelist_patterns,
            &self.whitelist_patterns_children,
        )?;

        let mut extractors = ExtractorRegistry::new();
        for binding in &self.extractors {
            if binding.extensions.is_empty() {
                return Err(PurgeError::Config(
                    "extractor binding without extensions".to_string(),
                ));
            }
            extractors.register(binding.extractor.build()?, &binding.extensions);
        }

        let mut content = Vec::new();
        for source in &self.content {
            match source {
                ContentSource::Glob(pattern) => {
                    content.extend(expand_glob(pattern)?.into_iter().map(ContentInput::File))
                }
                ContentSource::Raw { raw, extension } => content.push(ContentInput::Raw {
                    raw: raw.clone(),
                    extension: extension.clone(),
                }),
            }
        }
        dedup_preserving_order(&mut content);

        let mut css = Vec::new();
        for source in &self.css {
            match source {
                CssSource::Glob(pattern) => {
                    css.extend(expand_glob(pattern)?.into_iter().map(CssInput::File))
                }
                CssSource::Raw { raw } => css.push(CssInput::Raw(raw.clone())),
            }
        }
        dedup_preserving_order(&mut css);

        log::debug!(
            "compiled config: {} content inputs, {} stylesheets, {:?}",
            content.len(),
            css.len(),
            extractors
        );

        Ok(PurgeOptions {
            content,
            css,
            extractors,
            whitelist,
            prune: PruneOptions {
                keyframes: self.keyframes,
                font_face: self.font_face,
            },
            rejected: self.rejected,
            output: self.output.clone(),
        })
    }
}

/// Expand one glob into the regular files it matches, in path order.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|source| PurgeError::InvalidGlob {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| PurgeError::Read {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();

    if files.is_empty() {
        log::warn!("pattern `{}` matched no files", pattern);
    }
    Ok(files)
}

fn dedup_preserving_order<T: Clone + Eq + std::hash::Hash>(items: &mut Vec<T>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}
