use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Every failure the purge pipeline can report.
///
/// Configuration problems (bad globs, bad regexes, missing inputs) surface from
/// [`crate::config::PurgeConfig::compile`] before any file is scanned. Read,
/// parse and write failures surface from the engine, one file at a time.
#[derive(Debug, Error)]
pub enum PurgeError {
    /// The configuration is structurally incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A whitelist pattern or regex extractor did not compile.
    #[error("invalid regular expression `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid glob pattern `{pattern}`: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// A content or stylesheet file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse stylesheet {origin}: {message}")]
    CssParse { origin: String, message: String },

    #[error("failed to print stylesheet {origin}: {message}")]
    CssPrint { origin: String, message: String },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PurgeError>;
