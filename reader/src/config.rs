//! Site-generator configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All vocabulary options from `reader_core::Config` (flattened via serde)
//! - Output directory for the generated pages
//! - Optional story corpus (JSON) replacing the bundled samples
//!
//! # Example
//!
//! ```rust
//! use chinese_reader::ReaderConfig;
//!
//! let config = ReaderConfig::from_toml_str("hsk_level = 2\noutput_dir = \"site\"\n").unwrap();
//! assert_eq!(config.base().hsk_level, 2);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Vocabulary location and HSK level.
    #[serde(flatten)]
    pub base: reader_core::Config,

    /// Directory the HTML pages are written to.
    pub output_dir: PathBuf,

    /// JSON story corpus; the bundled samples are used when unset or missing.
    pub corpus: Option<PathBuf>,

    /// Site name shown in the sidebar and page titles.
    pub site_title: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            base: reader_core::Config::default(),
            output_dir: PathBuf::from("docs"),
            corpus: None,
            site_title: "Chinese Reader".to_string(),
        }
    }
}

impl ReaderConfig {
    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &reader_core::Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut reader_core::Config {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ReaderConfig::default();
        assert_eq!(cfg.output_dir, PathBuf::from("docs"));
        assert!(cfg.corpus.is_none());
        assert_eq!(cfg.base().hsk_level, 1);
    }

    #[test]
    fn flattened_fields_parse() {
        let cfg = ReaderConfig::from_toml_str(
            "vocab_dir = \"vocab\"\nhsk_level = 2\ncorpus = \"stories_bulk.json\"\n",
        )
        .unwrap();
        assert_eq!(cfg.base().vocab_dir, PathBuf::from("vocab"));
        assert_eq!(cfg.base().hsk_level, 2);
        assert_eq!(cfg.corpus, Some(PathBuf::from("stories_bulk.json")));
        assert_eq!(cfg.site_title, "Chinese Reader");
    }
}
