//! Search result view model.

use wire::SearchHit;

use super::escape::escape_html;
use super::highlight::{Span, highlight, spans_to_html};
use crate::i18n::Strings;

#[cfg(test)]
#[path = "result_test.rs"]
mod result_test;

pub const EXCERPT_MAX_CHARS: usize = 200;

const ELLIPSIS: &str = "...";
const DEFAULT_ICON: &str = "📄";

/// Display fields for one search hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultView {
    pub title: Vec<Span>,
    pub icon: &'static str,
    pub source_label: String,
    pub excerpt: Vec<Span>,
    /// e.g. `"87.5% relevance"`.
    pub score_label: String,
    /// e.g. `"Page 4"`.
    pub page_label: Option<String>,
}

impl ResultView {
    #[must_use]
    pub fn html(&self) -> String {
        let page = self
            .page_label
            .as_deref()
            .map(|label| format!("<span>{}</span>", escape_html(label)))
            .unwrap_or_default();
        format!(
            concat!(
                r#"<div class="result-item">"#,
                r#"<h3 class="result-title">{title}<span class="result-source">{icon} {source}</span></h3>"#,
                r#"<div class="result-content">{excerpt}</div>"#,
                r#"<div class="result-meta"><span class="result-score">{score}</span>{page}</div>"#,
                "</div>"
            ),
            title = spans_to_html(&self.title),
            icon = self.icon,
            source = escape_html(&self.source_label),
            excerpt = spans_to_html(&self.excerpt),
            score = escape_html(&self.score_label),
            page = page,
        )
    }
}

/// Build the view for one hit, highlighting `terms` in title and excerpt.
#[must_use]
pub fn render_hit(hit: &SearchHit, terms: &[String], strings: &Strings) -> ResultView {
    let title = hit
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(strings.untitled_document);
    let excerpt = truncate_excerpt(&hit.content, EXCERPT_MAX_CHARS);

    ResultView {
        title: highlight(title, terms),
        icon: file_icon(hit.source.as_deref()),
        source_label: source_label(hit.source.as_deref(), strings),
        excerpt: highlight(&excerpt, terms),
        score_label: score_label(hit.score, strings),
        page_label: hit.page.map(|page| format!("{} {page}", strings.page)),
    }
}

/// Cut `text` to at most `max_chars` characters, appending `...` when cut.
#[must_use]
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &text[..byte_idx]),
        None => text.to_owned(),
    }
}

/// Icon for a document, chosen by the extension of its source path.
#[must_use]
pub fn file_icon(source: Option<&str>) -> &'static str {
    let Some(source) = source else {
        return DEFAULT_ICON;
    };
    let extension = source.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "doc" | "docx" => "📝",
        "html" | "htm" => "🌐",
        "xls" | "xlsx" => "📊",
        "ppt" | "pptx" => "📑",
        _ => DEFAULT_ICON,
    }
}

/// Last path segment of the source, or the localized "Document".
#[must_use]
pub fn source_label(source: Option<&str>, strings: &Strings) -> String {
    source
        .and_then(|s| s.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or(strings.document)
        .to_owned()
}

/// Score in `0.0..=1.0` as a one-decimal percentage with the localized label.
#[must_use]
pub fn score_label(score: f64, strings: &Strings) -> String {
    format!("{:.1}% {}", score * 100.0, strings.relevance)
}
