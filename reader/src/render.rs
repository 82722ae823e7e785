//! HTML rendering of annotated stories.
//!
//! Pages are plain string templates. Vocabulary spans carry their pinyin and
//! gloss in `data-pinyin` / `data-english` attributes; the embedded client
//! script turns those into hover tooltips and tracks read articles in
//! `localStorage`.

use chrono::{Datelike, NaiveDate};
use reader_core::{Span, SpanSource};
use std::collections::BTreeMap;
use std::fmt::Write;

const STYLE: &str = include_str!("../assets/style.css");
const SCRIPT: &str = include_str!("../assets/reader.js");

/// Format of article file stems and `data-date` attributes.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A generated article as listed in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRef {
    pub date: NaiveDate,
    pub title: String,
}

impl ArticleRef {
    pub fn new<T: Into<String>>(date: NaiveDate, title: T) -> Self {
        Self {
            date,
            title: title.into(),
        }
    }

    /// `2026-10-19`
    pub fn date_key(&self) -> String {
        self.date.format(DATE_KEY_FORMAT).to_string()
    }

    /// `2026-10-19.html`
    pub fn file_name(&self) -> String {
        format!("{}.html", self.date_key())
    }
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Inverse of `escape_html`.
pub fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Render spans as the inner HTML of the article body.
pub fn render_spans(spans: &[Span]) -> String {
    let mut html = String::new();
    for span in spans {
        let class = match span.source {
            SpanSource::Passthrough => {
                if span.text == "\n" {
                    html.push_str("<br>");
                } else {
                    html.push_str(&escape_html(&span.text));
                }
                continue;
            }
            SpanSource::Known => "known",
            SpanSource::Extra | SpanSource::Unmatched => "unknown",
        };
        let _ = write!(
            html,
            r#"<span class="{}" data-pinyin="{}" data-english="{}">{}</span>"#,
            class,
            escape_html(&span.pronunciation),
            escape_html(&span.gloss),
            escape_html(&span.text)
        );
    }
    html
}

/// Sidebar article list grouped by month, newest first.
pub fn render_sidebar(articles: &[ArticleRef], current: Option<NaiveDate>) -> String {
    let mut by_month: BTreeMap<(i32, u32), Vec<&ArticleRef>> = BTreeMap::new();
    for article in articles {
        by_month
            .entry((article.date.year(), article.date.month()))
            .or_default()
            .push(article);
    }

    let mut html = String::new();
    for (_, mut month_articles) in by_month.into_iter().rev() {
        month_articles.sort_by(|a, b| b.date.cmp(&a.date));
        let label = month_articles[0].date.format("%B %Y");
        let _ = write!(
            html,
            "\n        <div class=\"month-group\">\n            <div class=\"month-header\">{label}</div>\n            <ul>"
        );
        for article in month_articles {
            let current_class = if Some(article.date) == current {
                r#" class="current""#
            } else {
                ""
            };
            let _ = write!(
                html,
                r#"<li data-date="{key}"{current_class}><span class="check">○</span><a href="{file}">{title}</a></li>"#,
                key = article.date_key(),
                file = article.file_name(),
                title = escape_html(&article.title),
            );
        }
        html.push_str("</ul>\n        </div>");
    }
    html
}

/// Full page for one article.
pub fn render_article_page(
    site_title: &str,
    article: &ArticleRef,
    hsk_level: u8,
    body_html: &str,
    sidebar_html: &str,
) -> String {
    let title = escape_html(&article.title);
    let site = escape_html(site_title);
    let date_label = article.date.format("%B %d, %Y");
    let date_key = article.date_key();
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - {site}</title>
    <style>{STYLE}</style>
</head>
<body>
    <nav class="sidebar">
        <h2>📚 {site}</h2>
        <div class="stats">Loading...</div>
        {sidebar_html}
    </nav>

    <main class="main">
        <h1>{title}</h1>
        <div class="date">{date_label} · HSK Level {hsk_level}</div>

        <div class="content">{body_html}</div>

        <div class="actions">
            <button id="readBtn" class="read-btn unread">✓ Mark as Read</button>
        </div>

        <div class="legend">
            <span class="legend-unknown">Highlighted</span> = Beyond HSK {hsk_level} (hover for pinyin + translation)
        </div>
    </main>

    <div id="tooltip" class="tooltip" style="display: none;"></div>

    <script>
{SCRIPT}
        initArticle('{date_key}');
    </script>
</body>
</html>"#
    )
}

/// Landing page that redirects to the newest article.
pub fn render_index_page(site_title: &str, sidebar_html: &str, latest: NaiveDate) -> String {
    let site = escape_html(site_title);
    let latest_file = format!("{}.html", latest.format(DATE_KEY_FORMAT));
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{site}</title>
    <meta http-equiv="refresh" content="0; url={latest_file}">
    <style>{STYLE}</style>
</head>
<body>
    <nav class="sidebar">
        <h2>📚 {site}</h2>
        <div class="stats">Loading...</div>
        {sidebar_html}
    </nav>
    <main class="main">
        <h1>Welcome</h1>
        <p>Redirecting to the latest article...</p>
        <p><a href="{latest_file}">Click here if not redirected</a></p>
    </main>
    <script>
{SCRIPT}
        updateSidebar();
    </script>
</body>
</html>"#
    )
}
