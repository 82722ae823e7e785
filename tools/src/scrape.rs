//! Story scraper for chinesegradedreader.com.
//!
//! Walks the HSK index pages, follows every story link and keeps the lines
//! of each story page that carry at least three Chinese characters. Fetch
//! failures are logged and the page is skipped; a failed run still writes
//! whatever was collected.
//!
//! Uses the `reqwest` blocking client; the scraper is sequential and polite
//! (fixed delay between story pages), so no async runtime is needed.

use anyhow::Result;
use once_cell::sync::Lazy;
use reader_core::story::dedup_stories;
use reader_core::utils::{count_chinese, strip_whitespace};
use reader_core::Story;
use regex::Regex;
use std::collections::HashSet;
use std::thread::sleep;
use std::time::Duration;
use tracing::{info, warn};

use crate::html_text::{html_to_text, strip_tags};

pub const SOURCE_NAME: &str = "chinesegradedreader.com";

pub const DEFAULT_INDEX_URLS: &[&str] = &[
    "https://chinesegradedreader.com/free-hsk-1-graded-reader-stories/",
    "https://chinesegradedreader.com/free-hsk-2-graded-reader-stories/",
];

const USER_AGENT: &str = "Mozilla/5.0 (compatible; educational-scraper/1.0)";

/// Lines with fewer Chinese characters are navigation or translation.
const MIN_CHINESE_PER_LINE: usize = 3;
/// Pages with fewer story lines are not stories.
const MIN_LINES_PER_STORY: usize = 3;
/// Whitespace-free content prefix used to spot duplicate stories.
const DEDUP_PREFIX_CHARS: usize = 100;

static STORY_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"href="(https://chinesegradedreader\.com/free-hsk-[12]-graded-reader-stories/[^/"]+/)""#,
    )
    .expect("valid regex")
});
static H1_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<h1[^>]*>(.*?)</h1>").expect("valid regex"));

/// Scraper settings.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub index_urls: Vec<String>,
    /// Pause after each story page.
    pub delay: Duration,
    pub timeout: Duration,
    /// Extra attempts after the first failure.
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            index_urls: DEFAULT_INDEX_URLS.iter().map(|s| s.to_string()).collect(),
            delay: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
            retries: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

pub struct Scraper {
    client: reqwest::blocking::Client,
    options: ScrapeOptions,
}

impl Scraper {
    pub fn new(options: ScrapeOptions) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .build()?;
        Ok(Self { client, options })
    }

    /// Fetch a page as text, retrying on failure. `None` after the last attempt fails.
    pub fn fetch(&self, url: &str) -> Option<String> {
        for attempt in 0..=self.options.retries {
            match self.fetch_once(url) {
                Ok(body) => return Some(body),
                Err(e) if attempt < self.options.retries => {
                    warn!(url, attempt, error = %e, "fetch failed, retrying");
                    sleep(self.options.retry_delay);
                }
                Err(e) => warn!(url, error = %e, "fetch failed"),
            }
        }
        None
    }

    fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send()?.error_for_status()?;
        let bytes = response.bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Story URLs from every index page, first occurrence order.
    pub fn collect_story_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        for index in &self.options.index_urls {
            info!(url = %index, "fetching index");
            if let Some(html) = self.fetch(index) {
                urls.extend(story_links(&html));
            }
        }
        dedup_preserving_order(urls)
    }

    /// Fetch every story and return the de-duplicated corpus.
    pub fn run(&self) -> Vec<Story> {
        let urls = self.collect_story_urls();
        info!(count = urls.len(), "found story urls");

        let mut stories = Vec::new();
        for url in &urls {
            info!(slug = slug(url), "fetching story");
            let Some(html) = self.fetch(url) else {
                continue;
            };
            match story_from_page(&html, url) {
                Some(story) => {
                    info!(lines = story.content.split("\n\n").count(), "kept story");
                    stories.push(story);
                }
                None => info!(url = %url, "too few Chinese lines, skipped"),
            }
            sleep(self.options.delay);
        }

        let unique = dedup_stories(stories, DEDUP_PREFIX_CHARS);
        info!(count = unique.len(), "unique stories");
        unique
    }
}

/// Story links on an index page, in page order (duplicates kept).
pub fn story_links(html: &str) -> Vec<String> {
    STORY_LINK_RE
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

/// Last path segment of a story URL.
pub fn slug(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

/// Tag-stripped text of the first `<h1>`.
pub fn page_title(html: &str) -> Option<String> {
    H1_RE
        .captures(html)
        .map(|caps| strip_tags(&caps[1]))
        .filter(|t| !t.is_empty())
}

/// Lines carrying story text, with `{Play}` audio markers removed and
/// repeats (ignoring whitespace) dropped.
pub fn extract_chinese_lines(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut lines = Vec::new();
    for line in text.lines() {
        let line = line.trim().replace("{Play}", "");
        let line = line.trim();
        if count_chinese(line) < MIN_CHINESE_PER_LINE {
            continue;
        }
        if seen.insert(strip_whitespace(line)) {
            lines.push(line.to_string());
        }
    }
    lines
}

/// Build a story from a fetched page, or `None` if it has too little text.
pub fn story_from_page(html: &str, url: &str) -> Option<Story> {
    let lines = extract_chinese_lines(&html_to_text(html));
    if lines.len() < MIN_LINES_PER_STORY {
        return None;
    }
    let title = page_title(html).unwrap_or_else(|| slug(url).to_string());
    let mut story = Story::new(title, lines.join("\n\n"));
    story.source = Some(SOURCE_NAME.to_string());
    Some(story)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
        <a href="https://chinesegradedreader.com/free-hsk-1-graded-reader-stories/thank-you/">Thank You</a>
        <a href="https://chinesegradedreader.com/free-hsk-2-graded-reader-stories/at-the-zoo/">Zoo</a>
        <a href="https://chinesegradedreader.com/free-hsk-1-graded-reader-stories/thank-you/">again</a>
        <a href="https://chinesegradedreader.com/free-hsk-3-graded-reader-stories/too-hard/">HSK 3</a>
        <a href="https://chinesegradedreader.com/free-hsk-1-graded-reader-stories/">index</a>
    "#;

    const STORY: &str = r#"<html><head><title>x</title><script>var s = "我们你们他们";</script></head>
        <body><h1 class="entry-title">Thank You <span>(谢谢 你)</span></h1>
        <p>{Play} 我今天很高兴。</p>
        <p>Wǒ jīntiān hěn gāoxìng.</p>
        <p>I am very happy today.</p>
        <p>谢谢你的帮助！</p>
        <p>谢谢你的 帮助！</p>
        <p>不客气，朋友。</p>
        <div>好</div>
        </body></html>"#;

    #[test]
    fn index_links_in_order() {
        let links = dedup_preserving_order(story_links(INDEX));
        assert_eq!(
            links,
            vec![
                "https://chinesegradedreader.com/free-hsk-1-graded-reader-stories/thank-you/",
                "https://chinesegradedreader.com/free-hsk-2-graded-reader-stories/at-the-zoo/",
            ]
        );
    }

    #[test]
    fn slug_is_last_segment() {
        assert_eq!(
            slug("https://chinesegradedreader.com/free-hsk-1-graded-reader-stories/thank-you/"),
            "thank-you"
        );
    }

    #[test]
    fn story_lines_and_title() {
        let story = story_from_page(STORY, "https://example.com/s/thank-you/").unwrap();
        assert_eq!(story.title, "Thank You (谢谢 你)");
        assert_eq!(story.content, "我今天很高兴。\n\n谢谢你的帮助！\n\n不客气，朋友。");
        assert_eq!(story.source.as_deref(), Some(SOURCE_NAME));
    }

    #[test]
    fn short_pages_are_not_stories() {
        let html = "<h1>Empty</h1><p>你好吗？</p><p>我很好。</p>";
        assert!(story_from_page(html, "https://example.com/s/empty/").is_none());
    }

    #[test]
    fn title_falls_back_to_slug() {
        let html = "<p>第一行中文。</p><p>第二行中文。</p><p>第三行中文。</p>";
        let story = story_from_page(html, "https://example.com/s/no-title/").unwrap();
        assert_eq!(story.title, "no-title");
    }

    #[test]
    #[ignore]
    fn scrape_real_index() {
        let scraper = Scraper::new(ScrapeOptions::default()).unwrap();
        let urls = scraper.collect_story_urls();
        println!("found {} story urls", urls.len());
    }
}
