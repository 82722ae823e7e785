//! Story records and the corpus file.
//!
//! A story's `content` is freeform text whose paragraphs are separated by
//! blank lines. The corpus on disk is a JSON array of stories
//! (`stories_bulk.json`), written by the corpus tools and read by the site
//! generator. Three graded stories are bundled for when no corpus exists.

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::utils::strip_whitespace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub content: String,
    /// Site the story was scraped from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Story {
    pub fn new<T: Into<String>, C: Into<String>>(title: T, content: C) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            source: None,
        }
    }

    /// Non-empty, trimmed paragraphs in order.
    pub fn paragraphs(&self) -> Vec<&str> {
        split_paragraphs(&self.content)
    }

    /// Key used to spot the same story under different titles.
    pub fn dedup_key(&self, prefix_chars: usize) -> String {
        dedup_key(&self.content, prefix_chars)
    }
}

/// Split text on blank lines (lines containing only whitespace).
pub fn split_paragraphs(content: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                paragraphs.push(content[s..end].trim());
            }
        } else {
            if start.is_none() {
                start = Some(offset);
            }
            end = offset + line.len();
        }
        offset += line.len();
    }
    if let Some(s) = start {
        paragraphs.push(content[s..end].trim());
    }
    paragraphs
}

/// First `prefix_chars` characters of `content` with all whitespace removed.
pub fn dedup_key(content: &str, prefix_chars: usize) -> String {
    strip_whitespace(content).chars().take(prefix_chars).collect()
}

/// Keep the first story for each dedup key, preserving order.
pub fn dedup_stories(stories: Vec<Story>, prefix_chars: usize) -> Vec<Story> {
    let mut seen = std::collections::HashSet::new();
    stories
        .into_iter()
        .filter(|s| seen.insert(s.dedup_key(prefix_chars)))
        .collect()
}

/// Pick the story for a calendar date: `stories[day_of_year % len]`.
///
/// The day of year is 1-based, so January 1st selects index 1 when there
/// are at least two stories.
pub fn story_for_date(stories: &[Story], date: NaiveDate) -> Option<&Story> {
    if stories.is_empty() {
        return None;
    }
    let index = date.ordinal() as usize % stories.len();
    stories.get(index)
}

/// Read a JSON corpus file.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Story>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading corpus {}", path.display()))?;
    let stories: Vec<Story> = serde_json::from_str(&content)
        .with_context(|| format!("parsing corpus {}", path.display()))?;
    debug!(path = %path.display(), stories = stories.len(), "loaded corpus");
    Ok(stories)
}

/// Write a JSON corpus file (pretty, non-ASCII kept as-is).
pub fn save_corpus<P: AsRef<Path>>(path: P, stories: &[Story]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(stories)?;
    std::fs::write(path, content).with_context(|| format!("writing corpus {}", path.display()))?;
    Ok(())
}

/// The bundled HSK 1 stories.
pub fn sample_stories() -> Vec<Story> {
    vec![
        Story::new(
            "我的一天",
            "今天是星期一。我早上六点起床。\n\n\
             我先喝茶，然后吃饭。我吃米饭和菜。\n\n\
             八点我去学校。我坐出租车去。\n\n\
             在学校，我学习中文。老师很好。我们看书，写字。\n\n\
             中午十二点，我和朋友吃饭。我们去饭店。我喜欢吃中国菜。\n\n\
             下午我在学校读书。五点我回家。\n\n\
             晚上我看电视。我喜欢看电影。\n\n\
             十点我睡觉。今天很好！",
        ),
        Story::new(
            "我的家",
            "我家有五个人：爸爸、妈妈、哥哥、妹妹和我。\n\n\
             爸爸四十五岁。他工作很忙。他喜欢喝茶。\n\n\
             妈妈四十三岁。她做饭很好吃。她喜欢买东西。\n\n\
             哥哥二十岁。他是大学生。他喜欢打电话。\n\n\
             妹妹十五岁。她是中学生。她喜欢看书。\n\n\
             我们家有一只狗。狗的名字叫小白。它很可爱。\n\n\
             星期天，我们一起吃饭，看电视。我爱我的家。",
        ),
        Story::new(
            "去商店",
            "今天是星期六。我和妈妈去商店买东西。\n\n\
             商店很大。里面有很多人。\n\n\
             我想买一本书。那本书很好看。\n\n\
             妈妈想买水果。苹果三块钱一斤。妈妈买了五斤。\n\n\
             我们也买了一些茶。爸爸很喜欢喝茶。\n\n\
             在商店，我看见一只小猫。它很可爱！\n\n\
             我们买了很多东西。我们很高兴。\n\n\
             下午我们回家。妈妈做饭，我看书。今天很好！",
        ),
    ]
}
