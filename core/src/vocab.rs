//! Vocabulary tables for the annotator.
//!
//! A `Vocabulary` maps a Chinese term (1-4 characters) to its pronunciation
//! and an English gloss. Two independent tables are used at runtime: the
//! learner's known set (an HSK word list) and a supplementary glossary for
//! words outside it.
//!
//! Tables are loaded from CSV rows `chinese,pinyin,english[,...]`. Fields may
//! be double-quoted to embed commas (`好,hǎo,"good, well"`). Rows with fewer
//! than three fields are skipped; a later row for the same term replaces the
//! earlier one.
//!
//! Tables can also be compiled to a bincode cache (`save_bincode`);
//! `load_cached_or_csv` reads the cache while it is newer than its CSV.

use anyhow::Context;
use csv_core::ReadFieldResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, warn};

type TermMap = HashMap<String, VocabEntry, ahash::RandomState>;

/// Pronunciation and gloss for a single term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub pronunciation: String,
    pub gloss: String,
}

impl VocabEntry {
    pub fn new<P: Into<String>, G: Into<String>>(pronunciation: P, gloss: G) -> Self {
        Self {
            pronunciation: pronunciation.into(),
            gloss: gloss.into(),
        }
    }
}

/// Read-only lookup table from Chinese term to `VocabEntry`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: TermMap,
}

impl Vocabulary {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            terms: TermMap::default(),
        }
    }

    /// Insert or replace the entry for `term`.
    pub fn insert<T: Into<String>>(&mut self, term: T, entry: VocabEntry) {
        self.terms.insert(term.into(), entry);
    }

    pub fn get(&self, term: &str) -> Option<&VocabEntry> {
        self.terms.get(term)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over `(term, entry)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VocabEntry)> {
        self.terms.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a table from CSV text.
    pub fn from_csv_str(content: &str) -> anyhow::Result<Self> {
        let mut vocab = Self::new();
        for (line_no, fields) in parse_csv_records(content.as_bytes())?
            .into_iter()
            .enumerate()
        {
            if fields.len() == 1 && fields[0].trim().is_empty() {
                continue;
            }
            if fields.len() < 3 {
                debug!(line = line_no + 1, ?fields, "skipping short vocabulary row");
                continue;
            }
            let term = fields[0].trim();
            if term.is_empty() {
                debug!(line = line_no + 1, "skipping vocabulary row with empty term");
                continue;
            }
            vocab.insert(term, VocabEntry::new(fields[1].trim(), fields[2].trim()));
        }
        Ok(vocab)
    }

    /// Load a table from a CSV file.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading vocabulary {}", path.display()))?;
        let vocab = Self::from_csv_str(&content)
            .with_context(|| format!("parsing vocabulary {}", path.display()))?;
        debug!(path = %path.display(), terms = vocab.len(), "loaded vocabulary");
        Ok(vocab)
    }

    /// Like `load_csv`, but a missing file yields an empty table.
    pub fn load_csv_or_empty<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "vocabulary file not found, using empty table");
            return Ok(Self::new());
        }
        Self::load_csv(path)
    }

    /// Load from a bincode cache when it is at least as new as the CSV it was
    /// compiled from, otherwise from the CSV (empty if that is missing too).
    ///
    /// An unreadable cache is logged and the CSV used instead.
    pub fn load_cached_or_csv<C: AsRef<Path>, P: AsRef<Path>>(
        cache: C,
        csv: P,
    ) -> anyhow::Result<Self> {
        let (cache, csv) = (cache.as_ref(), csv.as_ref());
        if cache_is_fresh(cache, csv) {
            match Self::load_bincode(cache) {
                Ok(vocab) => {
                    debug!(path = %cache.display(), terms = vocab.len(), "loaded vocabulary cache");
                    return Ok(vocab);
                }
                Err(e) => warn!(path = %cache.display(), error = %e, "unreadable vocabulary cache"),
            }
        }
        Self::load_csv_or_empty(csv)
    }

    /// Save the table to a file using bincode serialization.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Load a table from a bincode file produced by `save_bincode`.
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let vocab: Self = bincode::deserialize_from(reader)?;
        Ok(vocab)
    }
}

impl<T: Into<String>> FromIterator<(T, VocabEntry)> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = (T, VocabEntry)>>(iter: I) -> Self {
        let mut vocab = Self::new();
        for (term, entry) in iter {
            vocab.insert(term, entry);
        }
        vocab
    }
}

/// A cache is fresh if it exists and its source is missing or not newer.
fn cache_is_fresh(cache: &Path, source: &Path) -> bool {
    let modified = |p: &Path| std::fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(cache), modified(source)) {
        (Some(cache_time), Some(source_time)) => cache_time >= source_time,
        (Some(_), None) => !source.exists(),
        _ => false,
    }
}

/// Split CSV bytes into records of fields.
///
/// Fields longer than the scratch buffer are accumulated across
/// `OutputFull` results.
fn parse_csv_records(mut bytes: &[u8]) -> anyhow::Result<Vec<Vec<String>>> {
    let mut rdr = csv_core::Reader::new();
    let mut output = [0; 4096];
    let mut field = Vec::new();
    let mut record = Vec::new();
    let mut records = Vec::new();

    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        bytes = &bytes[nin..];
        field.extend_from_slice(&output[..nout]);
        match result {
            // Input exhausted: the next call with an empty slice flushes the last field.
            ReadFieldResult::InputEmpty | ReadFieldResult::OutputFull => {}
            ReadFieldResult::Field { record_end } => {
                let text = String::from_utf8(std::mem::take(&mut field))
                    .with_context(|| format!("invalid UTF-8 in row {}", records.len() + 1))?;
                record.push(text);
                if record_end {
                    records.push(std::mem::take(&mut record));
                }
            }
            ReadFieldResult::End => break,
        }
    }
    Ok(records)
}
