//! Case-insensitive query-term highlighting.
//!
//! Highlighting works on raw text and produces spans; escaping happens when
//! spans are turned into HTML. A term can therefore never match inside an
//! entity or tag that escaping introduced.

use super::escape::escape_html;

#[cfg(test)]
#[path = "highlight_test.rs"]
mod highlight_test;

/// Terms shorter than this many characters plus one are never highlighted.
const MIN_TERM_CHARS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub highlighted: bool,
}

/// Highlightable terms of a query: whitespace-separated tokens longer than
/// two characters.
#[must_use]
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|term| term.chars().count() > MIN_TERM_CHARS)
        .map(str::to_owned)
        .collect()
}

/// Split `text` into spans, marking every case-insensitive occurrence of any
/// term. Overlapping or adjacent matches merge into one highlighted span.
#[must_use]
pub fn highlight(text: &str, terms: &[String]) -> Vec<Span> {
    let chars: Vec<char> = text.chars().collect();
    let folded: Vec<char> = chars.iter().map(|c| fold(*c)).collect();
    let mut marked = vec![false; chars.len()];

    for term in terms {
        let needle: Vec<char> = term.chars().map(fold).collect();
        if needle.is_empty() || needle.len() > folded.len() {
            continue;
        }
        let mut start = 0;
        while start + needle.len() <= folded.len() {
            if folded[start..start + needle.len()] == needle[..] {
                marked[start..start + needle.len()].fill(true);
                start += needle.len();
            } else {
                start += 1;
            }
        }
    }

    let mut spans: Vec<Span> = Vec::new();
    for (c, hit) in chars.into_iter().zip(marked) {
        match spans.last_mut() {
            Some(span) if span.highlighted == hit => span.text.push(c),
            _ => spans.push(Span { text: c.to_string(), highlighted: hit }),
        }
    }
    spans
}

/// Escaped HTML with highlighted spans wrapped in `<span class="highlight">`.
#[must_use]
pub fn spans_to_html(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        if span.highlighted {
            out.push_str(r#"<span class="highlight">"#);
            out.push_str(&escape_html(&span.text));
            out.push_str("</span>");
        } else {
            out.push_str(&escape_html(&span.text));
        }
    }
    out
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
