//! Greedy longest-match annotation.
//!
//! `segment` walks the text once, left to right. Non-Chinese characters pass
//! through as their own spans. At a Chinese character the matcher probes
//! windows of 4, 3, 2 and 1 characters; at each length the known table is
//! checked before the extra table, and the first hit wins. A character with
//! no entry at any length becomes a one-character `?` span and is recorded in
//! the run's `UnknownChars`.
//!
//! Probe windows never extend past the end of the text or across a
//! non-Chinese character, so spans never mix scripts.

use crate::utils::is_chinese_char;
use crate::vocab::{VocabEntry, Vocabulary};
use crate::MAX_TERM_LEN;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Placeholder pronunciation and gloss for unmatched characters.
pub const UNKNOWN_MARK: &str = "?";

/// Where a span's annotation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanSource {
    /// Non-Chinese character copied through unannotated.
    Passthrough,
    /// Matched in the known table.
    Known,
    /// Matched in the extra table.
    Extra,
    /// Chinese character with no entry in either table.
    Unmatched,
}

/// One annotated run of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub pronunciation: String,
    pub gloss: String,
    pub source: SpanSource,
}

impl Span {
    fn passthrough(ch: char) -> Self {
        Self {
            text: ch.to_string(),
            pronunciation: String::new(),
            gloss: String::new(),
            source: SpanSource::Passthrough,
        }
    }

    fn matched(text: &str, entry: &VocabEntry, source: SpanSource) -> Self {
        Self {
            text: text.to_string(),
            pronunciation: entry.pronunciation.clone(),
            gloss: entry.gloss.clone(),
            source,
        }
    }

    fn unmatched(ch: char) -> Self {
        Self {
            text: ch.to_string(),
            pronunciation: UNKNOWN_MARK.to_string(),
            gloss: UNKNOWN_MARK.to_string(),
            source: SpanSource::Unmatched,
        }
    }

    /// True for known-table matches and for passthrough text.
    ///
    /// Passthrough counts as known only so renderers leave punctuation and
    /// Latin text unhighlighted; use `is_passthrough` to tell them apart.
    pub fn is_known(&self) -> bool {
        matches!(self.source, SpanSource::Known | SpanSource::Passthrough)
    }

    pub fn is_passthrough(&self) -> bool {
        self.source == SpanSource::Passthrough
    }

    /// Length of the span in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Chinese characters seen during one run that neither table covers.
///
/// Ordered so reports are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownChars(BTreeSet<char>);

impl UnknownChars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `ch` was not already recorded.
    pub fn insert(&mut self, ch: char) -> bool {
        self.0.insert(ch)
    }

    pub fn contains(&self, ch: char) -> bool {
        self.0.contains(&ch)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for UnknownChars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.0 {
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}

/// Vocabulary coverage of one segmentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentStats {
    /// Spans starting with a Chinese character.
    pub chinese_words: usize,
    /// Of those, spans matched in the known table.
    pub known_words: usize,
    /// Chinese characters across all non-passthrough spans.
    pub chinese_chars: usize,
    /// Chinese characters inside known-table spans.
    pub known_chars: usize,
}

impl SegmentStats {
    /// Fraction of Chinese characters covered by the known table.
    pub fn known_ratio(&self) -> f32 {
        if self.chinese_chars == 0 {
            return 0.0;
        }
        self.known_chars as f32 / self.chinese_chars as f32
    }
}

/// Spans for one input plus the characters that had no coverage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    pub spans: Vec<Span>,
    pub unknown: UnknownChars,
}

impl Segmentation {
    pub fn stats(&self) -> SegmentStats {
        let mut stats = SegmentStats::default();
        for span in self.spans.iter().filter(|s| !s.is_passthrough()) {
            let chars = span.char_len();
            stats.chinese_words += 1;
            stats.chinese_chars += chars;
            if span.source == SpanSource::Known {
                stats.known_words += 1;
                stats.known_chars += chars;
            }
        }
        stats
    }

    /// Concatenated span text; equals the input that produced it.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Segment `text` against the two tables with a fresh unknown-character set.
pub fn segment(text: &str, known: &Vocabulary, extra: &Vocabulary) -> Segmentation {
    let mut unknown = UnknownChars::new();
    let spans = segment_into(text, known, extra, &mut unknown);
    Segmentation { spans, unknown }
}

/// Segment `text`, recording uncovered characters into a caller-owned set.
///
/// The set is only added to; callers reset it between runs.
pub fn segment_into(
    text: &str,
    known: &Vocabulary,
    extra: &Vocabulary,
    unknown: &mut UnknownChars,
) -> Vec<Span> {
    let chars: Vec<char> = text.chars().collect();
    // byte offset of each char, plus the end of the text
    let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    offsets.push(text.len());

    let mut spans = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if !is_chinese_char(ch) {
            spans.push(Span::passthrough(ch));
            i += 1;
            continue;
        }

        let run = chars[i..]
            .iter()
            .take(MAX_TERM_LEN)
            .take_while(|&&c| is_chinese_char(c))
            .count();

        match longest_match(text, &offsets, i, run, known, extra) {
            Some((len, span)) => {
                spans.push(span);
                i += len;
            }
            None => {
                unknown.insert(ch);
                spans.push(Span::unmatched(ch));
                i += 1;
            }
        }
    }
    spans
}

/// Ranked probe: length descending, known before extra at equal length.
fn longest_match(
    text: &str,
    offsets: &[usize],
    start: usize,
    max_len: usize,
    known: &Vocabulary,
    extra: &Vocabulary,
) -> Option<(usize, Span)> {
    for len in (1..=max_len).rev() {
        let chunk = &text[offsets[start]..offsets[start + len]];
        if let Some(entry) = known.get(chunk) {
            return Some((len, Span::matched(chunk, entry, SpanSource::Known)));
        }
        if let Some(entry) = extra.get(chunk) {
            return Some((len, Span::matched(chunk, entry, SpanSource::Extra)));
        }
    }
    None
}
