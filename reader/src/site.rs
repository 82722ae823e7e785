//! Daily site generation.
//!
//! Each run writes the article for one date, then rebuilds every existing
//! article page so the sidebars list the same set of dates, and finally
//! rewrites `index.html` to redirect to the newest article. Earlier articles
//! are not re-segmented: their annotated body is lifted out of the existing
//! page, so a vocabulary change only affects pages generated after it.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use reader_core::story::{load_corpus, sample_stories, story_for_date};
use reader_core::{segment, SegmentStats, Story, UnknownChars, Vocabulary};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ReaderConfig;
use crate::render::{
    render_article_page, render_index_page, render_sidebar, render_spans, unescape_html,
    ArticleRef, DATE_KEY_FORMAT,
};

static ARTICLE_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})\.html$").expect("valid regex"));
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<h1>(.+?)</h1>").expect("valid regex"));
static BODY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="content">(.*?)</div>\s*<div class="actions">"#)
        .expect("valid regex")
});

/// Summary of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub date: NaiveDate,
    pub title: String,
    pub stats: SegmentStats,
    /// Characters in today's story that neither table covers.
    pub unknown: UnknownChars,
    /// Articles listed in the sidebar, today's included.
    pub articles: usize,
    /// Older pages rebuilt with the new sidebar.
    pub rerendered: usize,
}

/// Vocabulary, stories and output settings for one site.
pub struct Site {
    config: ReaderConfig,
    known: Vocabulary,
    extra: Vocabulary,
    stories: Vec<Story>,
}

impl Site {
    pub fn new(
        config: ReaderConfig,
        known: Vocabulary,
        extra: Vocabulary,
        stories: Vec<Story>,
    ) -> Self {
        Self {
            config,
            known,
            extra,
            stories,
        }
    }

    /// Load vocabulary tables and stories as described by `config`.
    pub fn load(config: ReaderConfig) -> Result<Self> {
        let (known, extra) = config.base().load_vocabularies()?;
        info!(
            known = known.len(),
            extra = extra.len(),
            level = config.base().hsk_level,
            "vocabulary loaded"
        );

        let stories = match &config.corpus {
            Some(path) if path.exists() => {
                let stories = load_corpus(path)?;
                if stories.is_empty() {
                    warn!(path = %path.display(), "corpus is empty, using bundled stories");
                    sample_stories()
                } else {
                    stories
                }
            }
            Some(path) => {
                warn!(path = %path.display(), "corpus not found, using bundled stories");
                sample_stories()
            }
            None => sample_stories(),
        };

        Ok(Self::new(config, known, extra, stories))
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn known(&self) -> &Vocabulary {
        &self.known
    }

    pub fn extra(&self) -> &Vocabulary {
        &self.extra
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    fn article_path(&self, article: &ArticleRef) -> PathBuf {
        self.output_dir().join(article.file_name())
    }

    /// Write the article for `date`, refresh every sidebar and the index.
    pub fn generate(&self, date: NaiveDate) -> Result<GenerationReport> {
        let story = story_for_date(&self.stories, date).context("no stories available")?;
        let segmentation = segment(&story.content, &self.known, &self.extra);

        let out = self.output_dir();
        fs::create_dir_all(out)
            .with_context(|| format!("creating output directory {}", out.display()))?;

        let mut articles = scan_articles(out)?;
        match articles.iter_mut().find(|a| a.date == date) {
            Some(existing) => existing.title = story.title.clone(),
            None => articles.push(ArticleRef::new(date, story.title.clone())),
        }
        articles.sort_by_key(|a| a.date);

        let today = ArticleRef::new(date, story.title.clone());
        let body = render_spans(&segmentation.spans);
        self.write_article(&today, &body, &articles)?;

        let mut rerendered = 0;
        for article in articles.iter().filter(|a| a.date != date) {
            let path = self.article_path(article);
            let html = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            match extract_body(&html) {
                Some(body) => {
                    self.write_article(article, body, &articles)?;
                    rerendered += 1;
                }
                None => warn!(path = %path.display(), "no article body found, leaving page as is"),
            }
        }

        // articles always holds today's entry
        let latest = articles.last().map(|a| a.date).unwrap_or(date);
        let index = render_index_page(
            &self.config.site_title,
            &render_sidebar(&articles, None),
            latest,
        );
        let index_path = out.join("index.html");
        fs::write(&index_path, index)
            .with_context(|| format!("writing {}", index_path.display()))?;

        let report = GenerationReport {
            date,
            title: story.title.clone(),
            stats: segmentation.stats(),
            unknown: segmentation.unknown,
            articles: articles.len(),
            rerendered,
        };
        info!(
            title = %report.title,
            known = report.stats.known_words,
            total = report.stats.chinese_words,
            articles = report.articles,
            "generated article"
        );
        if !report.unknown.is_empty() {
            info!(count = report.unknown.len(), chars = %report.unknown, "characters without vocabulary");
        }
        Ok(report)
    }

    fn write_article(&self, article: &ArticleRef, body: &str, articles: &[ArticleRef]) -> Result<()> {
        let sidebar = render_sidebar(articles, Some(article.date));
        let page = render_article_page(
            &self.config.site_title,
            article,
            self.config.base().hsk_level,
            body,
            &sidebar,
        );
        let path = self.article_path(article);
        fs::write(&path, page).with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), "wrote article");
        Ok(())
    }
}

/// List `YYYY-MM-DD.html` pages in `dir` with the titles from their `<h1>`.
pub fn scan_articles(dir: &Path) -> Result<Vec<ArticleRef>> {
    let mut articles = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(caps) = name.to_str().and_then(|n| ARTICLE_FILE_RE.captures(n)) else {
            continue;
        };
        let key = &caps[1];
        let Ok(date) = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT) else {
            debug!(file = key, "skipping page with invalid date");
            continue;
        };
        let html = fs::read_to_string(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;
        let title = extract_title(&html).unwrap_or_else(|| key.to_string());
        articles.push(ArticleRef::new(date, title));
    }
    articles.sort_by_key(|a| a.date);
    Ok(articles)
}

/// Unescaped text of the first `<h1>`.
pub fn extract_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .map(|caps| unescape_html(caps[1].trim()))
}

/// Inner HTML of the article body, up to the actions block.
pub fn extract_body(html: &str) -> Option<&str> {
    BODY_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}
