use crate::config::SearchConfig;
use crate::console;
use crate::parse::Highlighter;
use crate::types::ResultRecord;
use once_cell::sync::Lazy;
use regex::Regex;

const ELLIPSIS: char = '…';

/// `種別: <label>` inside content, label ends at whitespace or punctuation
static CATEGORY_BADGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"種別:\s*([^\s、。,./]+)").expect("valid category badge regex"));

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// First `budget` characters with line breaks turned into spaces,
/// plus an ellipsis when the content was longer
pub fn snippet(content: &str, budget: usize) -> String {
    let mut out: String = content
        .chars()
        .take(budget)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if content.chars().nth(budget).is_some() {
        out.push(ELLIPSIS);
    }
    out
}

/// Category label for the badge, if the content carries one
pub fn category_badge(content: &str) -> Option<&str> {
    CATEGORY_BADGE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Escape `text`, wrapping highlighter matches in `<mark>`
pub fn highlight(text: &str, highlighter: Option<&Highlighter>) -> String {
    let Some(highlighter) = highlighter else {
        return html_escape(text);
    };
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in highlighter.ranges(text) {
        out.push_str(&html_escape(&text[last..start]));
        out.push_str("<mark>");
        out.push_str(&html_escape(&text[start..end]));
        out.push_str("</mark>");
        last = end;
    }
    out.push_str(&html_escape(&text[last..]));
    out
}

fn render_record(
    record: &ResultRecord,
    highlighter: Option<&Highlighter>,
    config: &SearchConfig,
) -> String {
    let href = if record.url.is_empty() { "#" } else { record.url.as_str() };
    let badge = if config.badges {
        category_badge(&record.content)
            .map(|label| format!(r#"<span class="badge">{}</span>"#, html_escape(label)))
            .unwrap_or_default()
    } else {
        String::new()
    };
    let snippet = snippet(&record.content, config.snippet_chars);
    format!(
        r#"<div class="result"><a href="{}">{}</a>{}<p>{}</p></div>"#,
        html_escape(href),
        highlight(&record.title, highlighter),
        badge,
        highlight(&snippet, highlighter),
    )
}

/// Render a result list; `query` enables highlighting
pub fn render_results(
    results: &[ResultRecord],
    query: Option<&str>,
    config: &SearchConfig,
) -> String {
    if results.is_empty() {
        return format!("<p>{}</p>", html_escape(&config.messages.no_results));
    }

    let highlighter = match query.filter(|_| config.highlight) {
        Some(q) => match Highlighter::new(q) {
            Ok(h) => h,
            Err(e) => {
                // Best effort: fall back to plain text
                console::warn(&format!("[search] highlight disabled for '{}': {}", q, e));
                None
            }
        },
        None => None,
    };

    results
        .iter()
        .map(|r| render_record(r, highlighter.as_ref(), config))
        .collect()
}
