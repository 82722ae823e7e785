//! Low-level HTML to text helpers for the scraper.
//!
//! A single forward scan over the markup; no DOM is built. Good enough for
//! the graded-reader pages, which are ordinary WordPress output.

/// Tags whose contents are dropped entirely.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript"];

/// Tags that start a new line when opened.
const BREAK_ON_OPEN: &[&str] = &["br", "p", "div", "h1", "h2", "h3", "h4", "li"];

/// Tags that start a new line when closed.
const BREAK_ON_CLOSE: &[&str] = &["p", "div", "h1", "h2", "h3", "h4", "li"];

/// Convert a page to plain text: script/style content removed, block
/// elements turned into line breaks, entities decoded.
///
/// A `<` not followed by a letter, `/` or `!` is literal text.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    // name of the script/style element whose content is being dropped
    let mut skipping: Option<String> = None;
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        if skipping.is_none() {
            out.push_str(&decode_entities(&rest[..lt]));
        }
        let tag_src = &rest[lt..];

        if !opens_markup(tag_src) {
            if skipping.is_none() {
                out.push('<');
            }
            rest = &tag_src[1..];
            continue;
        }

        if tag_src.starts_with("<!--") {
            rest = match tag_src.find("-->") {
                Some(end) => &tag_src[end + 3..],
                None => "",
            };
            continue;
        }

        let Some(gt) = tag_src.find('>') else {
            // unterminated tag: treat the rest as text
            if skipping.is_none() {
                out.push_str(&decode_entities(tag_src));
            }
            rest = "";
            break;
        };
        let (name, closing) = tag_name(&tag_src[1..gt]);
        rest = &tag_src[gt + 1..];

        if let Some(open) = skipping.as_deref() {
            let ends_skip = closing && open == name;
            if ends_skip {
                skipping = None;
            }
            continue;
        }
        if SKIP_TAGS.contains(&name.as_str()) {
            if !closing {
                skipping = Some(name);
            }
            continue;
        }
        let breaks = if closing { BREAK_ON_CLOSE } else { BREAK_ON_OPEN };
        if breaks.contains(&name.as_str()) {
            out.push('\n');
        }
    }
    if skipping.is_none() {
        out.push_str(&decode_entities(rest));
    }
    out
}

/// True if `s` (starting at `<`) begins a tag, end tag, comment or declaration.
fn opens_markup(s: &str) -> bool {
    s[1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

/// Lowercased tag name and whether it is a closing tag.
fn tag_name(inner: &str) -> (String, bool) {
    let inner = inner.trim_start();
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (name, closing)
}

/// Remove all tags `<...>`, decode entities and trim.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    decode_entities(&out).trim().to_string()
}

/// Decode named entities common on the site plus numeric references.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&after[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "hellip" => Some('…'),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        "lsquo" => Some('‘'),
        "rsquo" => Some('’'),
        "ldquo" => Some('“'),
        "rdquo" => Some('”'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(|c: char| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_tags_become_lines() {
        let html = "<div><p>你好</p><p>再见<br/>明天</p></div>";
        let text = html_to_text(html);
        let lines: Vec<_> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec!["你好", "再见", "明天"]);
    }

    #[test]
    fn script_and_style_are_dropped() {
        let html = "<head><style>p { color: red }</style><SCRIPT type=\"x\">var a = '<p>';</SCRIPT></head><p>正文</p><!-- <p>注释</p> -->";
        let text = html_to_text(html);
        assert_eq!(text.trim(), "正文");
    }

    #[test]
    fn bare_less_than_is_text() {
        let text = html_to_text("<p>三 < 五，我们很高兴。</p><p>明天见。</p>");
        assert_eq!(text.trim(), "三 < 五，我们很高兴。\n\n明天见。");
        assert_eq!(html_to_text("1<2").trim(), "1<2");
    }

    #[test]
    fn skip_ends_only_on_matching_close() {
        let html = "<script>var css = \"</style>\"; var n = 1;</script><p>正文</p><style>a{}</style>";
        assert_eq!(html_to_text(html).trim(), "正文");
    }

    #[test]
    fn entities_decode() {
        assert_eq!(decode_entities("A&amp;B&nbsp;&#20320;&#x597D;"), "A&B 你好");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn strip_tags_from_heading() {
        assert_eq!(
            strip_tags(" <span class=\"x\">Thank You</span> (谢谢 你) "),
            "Thank You (谢谢 你)"
        );
    }
}
