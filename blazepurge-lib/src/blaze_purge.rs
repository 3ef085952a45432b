use crate::config::{ContentInput, CssInput, PurgeOptions};
use crate::error::{PurgeError, Result};
use crate::style::{parse_stylesheet, SelectorPruner};
use crate::tokens::TokenSet;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// The purged form of one stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub struct PurgeResult {
    /// Source stylesheet, `None` for inline CSS.
    pub file: Option<PathBuf>,
    pub css: String,
    pub rejected: Vec<String>,
}

/// Runs extraction and pruning for one compiled configuration.
pub struct PurgeCss {
    options: PurgeOptions,
}

impl PurgeCss {
    pub fn new(options: PurgeOptions) -> Self {
        PurgeCss { options }
    }

    pub fn options(&self) -> &PurgeOptions {
        &self.options
    }

    /// Scan every content input and merge what was found.
    ///
    /// Inputs are read and tokenized in parallel; each produces its own set and
    /// the sets are merged afterwards. The first unreadable file fails the run.
    pub fn extract_tokens(&self) -> Result<TokenSet> {
        let per_input = self
            .options
            .content
            .par_iter()
            .map(|input| self.extract_input(input))
            .collect::<Result<Vec<TokenSet>>>()?;

        let tokens = per_input.into_iter().fold(TokenSet::new(), TokenSet::union);
        log::info!(
            "extracted {} distinct tokens from {} content inputs",
            tokens.len(),
            self.options.content.len()
        );
        Ok(tokens)
    }

    fn extract_input(&self, input: &ContentInput) -> Result<TokenSet> {
        match input {
            ContentInput::File(path) => {
                let text = fs::read_to_string(path).map_err(|source| PurgeError::Read {
                    path: path.clone(),
                    source,
                })?;
                let extractor = self.options.extractors.for_path(path);
                let tokens: TokenSet = extractor.extract(&text).into_iter().collect();
                log::debug!(
                    "{}: {} tokens ({} extractor)",
                    path.display(),
                    tokens.len(),
                    extractor.name()
                );
                Ok(tokens)
            }
            ContentInput::Raw { raw, extension } => {
                let extractor = self.options.extractors.for_extension(extension);
                Ok(extractor.extract(raw).into_iter().collect())
            }
        }
    }

    /// Extract tokens, then purge every stylesheet against them.
    pub fn purge(&self) -> Result<Vec<PurgeResult>> {
        let tokens = self.extract_tokens()?;
        self.purge_with_tokens(&tokens)
    }

    /// Purge every stylesheet against an already-built token set. Results keep
    /// the order of the configured stylesheets.
    pub fn purge_with_tokens(&self, tokens: &TokenSet) -> Result<Vec<PurgeResult>> {
        self.options
            .css
            .par_iter()
            .map(|input| self.purge_input(input, tokens))
            .collect()
    }

    fn purge_input(&self, input: &CssInput, tokens: &TokenSet) -> Result<PurgeResult> {
        let origin = input.origin();
        let (file, text) = match input {
            CssInput::File(path) => {
                let text = fs::read_to_string(path).map_err(|source| PurgeError::Read {
                    path: path.clone(),
                    source,
                })?;
                (Some(path.clone()), text)
            }
            CssInput::Raw(raw) => (None, raw.clone()),
        };

        let sheet = parse_stylesheet(&text, &origin)?;
        let outcome = SelectorPruner::new(tokens, &self.options.whitelist)
            .with_options(self.options.prune)
            .prune(&sheet);

        log::info!(
            "{}: kept {} of {} style rules, rejected {} selectors",
            origin,
            outcome.stylesheet.style_rule_count(),
            sheet.style_rule_count(),
            outcome.rejected.len()
        );

        Ok(PurgeResult {
            file,
            css: outcome.stylesheet.to_string(),
            rejected: outcome.rejected,
        })
    }
}

/// Write purged stylesheets under `output`.
///
/// A single result with an `output` ending in `.css` is written to that file.
/// Otherwise `output` is a directory and each result keeps its source file
/// name (`purged-N.css` for inline CSS); two results that would land on the
/// same file are a configuration error and nothing is written. Returns the
/// paths written.
pub fn write_results(results: &[PurgeResult], output: &Path) -> Result<Vec<PathBuf>> {
    if results.is_empty() {
        return Ok(Vec::new());
    }

    let is_file_target = results.len() == 1
        && output
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("css"));

    let mut targets = Vec::with_capacity(results.len());
    if is_file_target {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent)?;
        }
        targets.push(output.to_path_buf());
    } else {
        for (index, result) in results.iter().enumerate() {
            let name = result
                .file
                .as_deref()
                .and_then(Path::file_name)
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| format!("purged-{}.css", index).into());
            targets.push(output.join(name));
        }
        check_distinct_targets(results, &targets)?;
        create_dir(output)?;
    }

    for (result, target) in results.iter().zip(&targets) {
        fs::write(target, &result.css).map_err(|source| PurgeError::Write {
            path: target.clone(),
            source,
        })?;
        log::debug!("wrote {}", target.display());
    }
    Ok(targets)
}

fn check_distinct_targets(results: &[PurgeResult], targets: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<&Path, usize> = HashMap::with_capacity(targets.len());
    for (index, target) in targets.iter().enumerate() {
        if let Some(&first) = seen.get(target.as_path()) {
            return Err(PurgeError::Config(format!(
                "{} and {} would both be written to {}",
                result_origin(&results[first], first),
                result_origin(&results[index], index),
                target.display()
            )));
        }
        seen.insert(target, index);
    }
    Ok(())
}

fn result_origin(result: &PurgeResult, index: usize) -> String {
    match &result.file {
        Some(path) => path.display().to_string(),
        None => format!("inline stylesheet #{}", index),
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| PurgeError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentSource, CssSource, PurgeConfig};

    fn raw_config(content: &str, css: &str) -> PurgeConfig {
        PurgeConfig {
            content: vec![ContentSource::Raw {
                raw: content.to_string(),
                extension: "js".to_string(),
            }],
            css: vec![CssSource::Raw {
                raw: css.to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_purge_raw_inputs() {
        let config = raw_config(
            r#"document.body.className = "btn";"#,
            ".btn { color: red; } .unused { color: blue; }",
        );
        let purger = PurgeCss::new(config.compile().unwrap());
        let results = purger.purge().unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file, None);
        assert_eq!(results[0].css, ".btn {\n  color: red;\n}\n");
        assert_eq!(results[0].rejected, vec![".unused"]);
    }

    #[test]
    fn test_missing_content_file_is_fatal() {
        let mut options = raw_config("", ".a {}").compile().unwrap();
        options
            .content
            .push(ContentInput::File(PathBuf::from("definitely/missing.js")));

        let err = PurgeCss::new(options).extract_tokens().unwrap_err();
        assert!(matches!(err, PurgeError::Read { .. }));
    }

    #[test]
    fn test_write_results_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![
            PurgeResult {
                file: Some(PathBuf::from("src/index.css")),
                css: ".a {\n}\n".into(),
                rejected: vec![],
            },
            PurgeResult {
                file: None,
                css: ".b {\n}\n".into(),
                rejected: vec![],
            },
        ];

        let out = dir.path().join("dist");
        let written = write_results(&results, &out).unwrap();
        assert_eq!(written, vec![out.join("index.css"), out.join("purged-1.css")]);
        assert_eq!(fs::read_to_string(&written[1]).unwrap(), ".b {\n}\n");
    }

    #[test]
    fn test_same_file_names_in_directory_mode_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = |file: &str, css: &str| PurgeResult {
            file: Some(PathBuf::from(file)),
            css: css.into(),
            rejected: vec![],
        };
        let results = vec![result("a/index.css", "A"), result("b/index.css", "B")];

        let out = dir.path().join("dist");
        match write_results(&results, &out).unwrap_err() {
            PurgeError::Config(message) => {
                assert!(message.contains("a/index.css"), "{message}");
                assert!(message.contains("b/index.css"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn test_no_results_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("site.css");

        let written = write_results(&[], &target).unwrap();
        assert!(written.is_empty());
        assert!(!target.exists());
    }

    #[test]
    fn test_write_single_result_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out/site.min.css");
        let results = vec![PurgeResult {
            file: None,
            css: ".a {\n}\n".into(),
            rejected: vec![],
        }];

        let written = write_results(&results, &target).unwrap();
        assert_eq!(written, vec![target.clone()]);
        assert!(target.is_file());
    }
}
