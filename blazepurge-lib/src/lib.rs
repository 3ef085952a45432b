//! BlazePurge: remove CSS rules whose selectors never appear in your sources.
//!
//! Content files are scanned for tokens by pluggable extractors, stylesheets are
//! parsed with LightningCSS, and every rule whose selector names none of the
//! tokens (and is not whitelisted) is dropped.
//!
//! ```no_run
//! use blazepurge_lib::{PurgeConfig, PurgeCss};
//! use std::path::Path;
//!
//! let config = PurgeConfig::from_file(Path::new("purgecss.json"))?;
//! let results = PurgeCss::new(config.compile()?).purge()?;
//! for result in &results {
//!     print!("{}", result.css);
//! }
//! # Ok::<(), blazepurge_lib::PurgeError>(())
//! ```

pub mod blaze_purge;
pub mod config;
pub mod error;
pub mod extractor;
pub mod style;
pub mod tokens;

pub use blaze_purge::{write_results, PurgeCss, PurgeResult};
pub use config::{PurgeConfig, PurgeOptions};
pub use error::{PurgeError, Result};
pub use extractor::{ExtractorRegistry, TokenExtractor};
pub use tokens::TokenSet;
