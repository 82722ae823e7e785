//! reader-core
//!
//! Vocabulary tables, longest-match annotation and the story corpus shared by
//! the `chinese-reader` site generator and the corpus tools.
//!
//! Public API:
//! - `segment` / `segment_into` - Greedy longest-match annotation of raw text
//! - `Span`, `Segmentation`, `UnknownChars` - Annotation results
//! - `Vocabulary`, `VocabEntry` - Chinese term -> pronunciation + gloss tables
//! - `Story` - Title + paragraph content records, bundled samples, JSON corpus
//! - `Config` - Vocabulary source configuration
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod segment;
pub use segment::{
    segment, segment_into, SegmentStats, Segmentation, Span, SpanSource, UnknownChars,
};

pub mod vocab;
pub use vocab::{VocabEntry, Vocabulary};

pub mod story;
pub use story::{load_corpus, sample_stories, save_corpus, story_for_date, Story};

/// Longest vocabulary term considered by the matcher, in characters.
pub const MAX_TERM_LEN: usize = 4;

/// Configuration for locating the vocabulary tables.
///
/// Front-end crates flatten this into their own config (see
/// `chinese_reader::ReaderConfig`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `hsk{level}.csv` and the extra vocabulary file.
    pub vocab_dir: PathBuf,
    /// HSK level whose word list is treated as the learner's known set.
    pub hsk_level: u8,
    /// File name of the supplementary glossary inside `vocab_dir`.
    pub extra_vocab_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vocab_dir: PathBuf::from("."),
            hsk_level: 1,
            extra_vocab_file: "extra_vocab.csv".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Path of the known-vocabulary table, e.g. `<vocab_dir>/hsk1.csv`.
    pub fn known_vocab_path(&self) -> PathBuf {
        self.vocab_dir.join(format!("hsk{}.csv", self.hsk_level))
    }

    /// Path of the extra-vocabulary table.
    pub fn extra_vocab_path(&self) -> PathBuf {
        self.vocab_dir.join(&self.extra_vocab_file)
    }

    /// Compiled cache of the known table, e.g. `<vocab_dir>/hsk1.bin`.
    pub fn known_cache_path(&self) -> PathBuf {
        self.known_vocab_path().with_extension("bin")
    }

    /// Compiled cache of the extra table, e.g. `<vocab_dir>/extra_vocab.bin`.
    pub fn extra_cache_path(&self) -> PathBuf {
        self.extra_vocab_path().with_extension("bin")
    }

    /// Load both tables, from their compiled caches when those are up to
    /// date. Missing files yield empty tables.
    pub fn load_vocabularies(&self) -> anyhow::Result<(Vocabulary, Vocabulary)> {
        let known =
            Vocabulary::load_cached_or_csv(self.known_cache_path(), self.known_vocab_path())?;
        let extra =
            Vocabulary::load_cached_or_csv(self.extra_cache_path(), self.extra_vocab_path())?;
        Ok((known, extra))
    }
}

/// Utility helpers.
pub mod utils {
    /// True iff `ch` lies in the CJK Unified Ideographs block (U+4E00..=U+9FFF).
    pub fn is_chinese_char(ch: char) -> bool {
        ('\u{4E00}'..='\u{9FFF}').contains(&ch)
    }

    /// Number of Chinese characters in `s`.
    pub fn count_chinese(s: &str) -> usize {
        s.chars().filter(|&c| is_chinese_char(c)).count()
    }

    /// Fraction of non-whitespace characters that are Chinese (0.0 for blank input).
    pub fn chinese_ratio(s: &str) -> f32 {
        let mut total = 0usize;
        let mut chinese = 0usize;
        for c in s.chars().filter(|c| !c.is_whitespace()) {
            total += 1;
            if is_chinese_char(c) {
                chinese += 1;
            }
        }
        if total == 0 {
            return 0.0;
        }
        chinese as f32 / total as f32
    }

    /// Remove every whitespace character.
    pub fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;

    #[test]
    fn chinese_block_bounds() {
        assert!(is_chinese_char('\u{4E00}'));
        assert!(is_chinese_char('\u{9FFF}'));
        assert!(is_chinese_char('猫'));
        assert!(!is_chinese_char('\u{4DFF}'));
        assert!(!is_chinese_char('\u{A000}'));
        // full-width punctuation is not an ideograph
        assert!(!is_chinese_char('，'));
        assert!(!is_chinese_char('。'));
        assert!(!is_chinese_char('a'));
    }

    #[test]
    fn ratio_ignores_whitespace() {
        assert_eq!(chinese_ratio(""), 0.0);
        assert_eq!(chinese_ratio("   "), 0.0);
        assert_eq!(chinese_ratio("你 好"), 1.0);
        assert!((chinese_ratio("你好ab") - 0.5).abs() < f32::EPSILON);
        assert_eq!(count_chinese("Hi你好!"), 2);
    }

    #[test]
    fn config_paths_follow_level() {
        let mut cfg = Config::default();
        cfg.vocab_dir = PathBuf::from("data");
        cfg.hsk_level = 2;
        assert_eq!(cfg.known_vocab_path(), PathBuf::from("data").join("hsk2.csv"));
        assert_eq!(
            cfg.extra_vocab_path(),
            PathBuf::from("data").join("extra_vocab.csv")
        );
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let cfg = Config::from_toml_str("hsk_level = 3\n").unwrap();
        assert_eq!(cfg.hsk_level, 3);
        assert_eq!(cfg.extra_vocab_file, "extra_vocab.csv");

        let text = cfg.to_toml_string().unwrap();
        let back = Config::from_toml_str(&text).unwrap();
        assert_eq!(back.hsk_level, 3);
    }

    #[test]
    fn compiled_cache_is_used_when_present() {
        let mut cfg = Config::default();
        cfg.vocab_dir = std::env::temp_dir().join(format!(
            "reader_core_compiled_vocab_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&cfg.vocab_dir);
        std::fs::create_dir_all(&cfg.vocab_dir).unwrap();
        assert_eq!(cfg.extra_cache_path(), cfg.vocab_dir.join("extra_vocab.bin"));

        let known: Vocabulary = vec![("我", VocabEntry::new("wǒ", "I"))].into_iter().collect();
        known.save_bincode(cfg.known_cache_path()).unwrap();
        let (known, extra) = cfg.load_vocabularies().unwrap();
        assert!(known.contains("我"));
        assert!(extra.is_empty());
        let _ = std::fs::remove_dir_all(&cfg.vocab_dir);
    }

    #[test]
    fn missing_vocab_files_load_empty() {
        let mut cfg = Config::default();
        cfg.vocab_dir = std::env::temp_dir().join("reader_core_no_such_vocab_dir");
        let (known, extra) = cfg.load_vocabularies().unwrap();
        assert!(known.is_empty());
        assert!(extra.is_empty());
    }
}
