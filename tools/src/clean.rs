//! Corpus cleaning: keep only the Chinese narrative lines of scraped stories.
//!
//! Scraped pages interleave the Chinese text with pinyin, English
//! translations and site navigation. Each line is filtered on its own, then
//! whole stories that end up too short are dropped.

use once_cell::sync::Lazy;
use reader_core::story::dedup_stories;
use reader_core::utils::{chinese_ratio, is_chinese_char};
use reader_core::{sample_stories, Story};
use regex::Regex;
use tracing::debug;

/// Lines with a lower share of Chinese characters are pinyin or English.
const MIN_CHINESE_RATIO: f32 = 0.3;
const MIN_LINES: usize = 3;
/// Minimum content length in characters, blank-line separators included.
const MIN_CONTENT_CHARS: usize = 50;
const FALLBACK_TITLE_CHARS: usize = 20;
pub const DEDUP_PREFIX_CHARS: usize = 80;

// "Thank You (谢谢你)" style links from the site navigation
static NAV_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z].*\(.*[\x{4e00}-\x{9fff}].*\)$").expect("valid regex"));
static ENGLISH_RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z]{2,}\s+[A-Za-z]{2,}\s+[A-Za-z]{2,}").expect("valid regex")
});
static CHINESE_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[（(]([^）)]*[\x{4e00}-\x{9fff}]+[^）)]*)[）)]").expect("valid regex")
});

/// Outcome of cleaning a whole corpus.
#[derive(Debug)]
pub struct CleanReport {
    pub stories: Vec<Story>,
    /// Scraped stories dropped as too short.
    pub skipped: usize,
}

/// Filtered form of one line, or `None` if the line is not story text.
pub fn clean_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || chinese_ratio(line) < MIN_CHINESE_RATIO {
        return None;
    }
    let line = line.replace("{Play}", "");
    let line = line.trim();
    if NAV_TITLE_RE.is_match(line) || ENGLISH_RUN_RE.is_match(line) {
        return None;
    }
    let line = line.replace("Chinese", "");
    let line = line.trim();
    if line.is_empty() || line.starts_with("HSK") || line.to_lowercase().contains("graded reader") {
        return None;
    }
    Some(line.to_string())
}

/// Chinese part of a bilingual title such as `Thank You (谢谢 你)`.
///
/// Falls back to the first line of the story when the title has no Chinese
/// at all; a Chinese title without parentheses is kept as is.
pub fn clean_title(title: &str, first_line: &str) -> String {
    if let Some(caps) = CHINESE_TITLE_RE.captures(title) {
        return caps[1].trim().to_string();
    }
    if title.chars().any(is_chinese_char) {
        return title.to_string();
    }
    first_line.chars().take(FALLBACK_TITLE_CHARS).collect()
}

/// Clean one story, or `None` if too little Chinese text remains.
pub fn clean_story(story: &Story) -> Option<Story> {
    let mut lines: Vec<String> = story.content.lines().filter_map(clean_line).collect();
    if lines.len() < MIN_LINES {
        return None;
    }
    lines.dedup();

    let content = lines.join("\n\n");
    if content.chars().count() < MIN_CONTENT_CHARS {
        return None;
    }
    let mut cleaned = Story::new(clean_title(&story.title, &lines[0]), content);
    cleaned.source = story.source.clone();
    Some(cleaned)
}

/// Clean every story, append the bundled samples and drop duplicates.
pub fn clean_corpus(raw: &[Story]) -> CleanReport {
    let mut stories = Vec::with_capacity(raw.len() + 3);
    let mut skipped = 0;
    for story in raw {
        match clean_story(story) {
            Some(cleaned) => stories.push(cleaned),
            None => {
                debug!(title = %story.title, "dropped story");
                skipped += 1;
            }
        }
    }
    stories.extend(sample_stories());
    CleanReport {
        stories: dedup_stories(stories, DEDUP_PREFIX_CHARS),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_filters() {
        assert_eq!(clean_line("  {Play} 我今天很高兴。 ").as_deref(), Some("我今天很高兴。"));
        assert_eq!(clean_line("Wǒ jīntiān hěn gāoxìng."), None);
        assert_eq!(clean_line("Thank You (谢谢你们)"), None);
        assert_eq!(clean_line("我们 read more here 你好你好你好"), None);
        assert_eq!(clean_line("Chinese 你好你好"), Some("你好你好".to_string()));
        assert_eq!(clean_line("HSK一级故事"), None);
        assert_eq!(clean_line("中文 Graded Reader 故事"), None);
        assert_eq!(clean_line("   "), None);
    }

    #[test]
    fn titles() {
        assert_eq!(clean_title("Thank You (谢谢 你)", "x"), "谢谢 你");
        assert_eq!(clean_title("At the Zoo（在动物园）", "x"), "在动物园");
        assert_eq!(clean_title("我的家", "x"), "我的家");
        assert_eq!(
            clean_title("No Chinese here", "一二三四五六七八九十一二三四五六七八九十多余"),
            "一二三四五六七八九十一二三四五六七八九十"
        );
    }

    #[test]
    fn story_cleaning() {
        let raw = Story::new(
            "Thank You (谢谢你)",
            "Thank You (谢谢你)\n\
             {Play} 今天我的朋友来我家吃饭。\n\
             Jīntiān wǒ de péngyou lái wǒ jiā chīfàn.\n\
             Today my friend came to my home for dinner.\n\
             妈妈做了很多好吃的菜。\n\
             妈妈做了很多好吃的菜。\n\
             朋友说：谢谢你，阿姨！菜很好吃。\n\
             我们吃饭以后一起看电视，很高兴。",
        );
        let cleaned = clean_story(&raw).unwrap();
        assert_eq!(cleaned.title, "谢谢你");
        assert_eq!(
            cleaned.paragraphs(),
            vec![
                "今天我的朋友来我家吃饭。",
                "妈妈做了很多好吃的菜。",
                "朋友说：谢谢你，阿姨！菜很好吃。",
                "我们吃饭以后一起看电视，很高兴。",
            ]
        );
    }

    #[test]
    fn short_stories_dropped() {
        assert!(clean_story(&Story::new("t", "你好你好。\n再见再见。")).is_none());
        assert!(clean_story(&Story::new("t", "你好你好。\n再见再见。\n谢谢谢谢。")).is_none());
    }

    #[test]
    fn corpus_appends_samples_once() {
        let mut raw = vec![Story::new("junk", "only english here")];
        raw.extend(sample_stories());
        let report = clean_corpus(&raw);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.stories.len(), sample_stories().len());
        assert_eq!(report.stories[0].title, "我的一天");
    }
}
