//! Safe projections from state to display models.
//!
//! DESIGN
//! ======
//! Every string that reaches a surface as markup passes through
//! [`escape::escape_html`]. View models keep text structured (lines, spans)
//! so terminal hosts can render them without ever touching HTML, and HTML
//! hosts get markup where the only tags are the ones produced here.

pub mod escape;
pub mod highlight;
pub mod message;
pub mod result;

pub use escape::{escape_html, text_to_html};
pub use highlight::{Span, highlight, query_terms, spans_to_html};
pub use message::{MessageView, TYPING_INDICATOR_ID, TypingIndicatorView, render_greeting, render_message};
pub use result::{EXCERPT_MAX_CHARS, ResultView, file_icon, render_hit, score_label, source_label, truncate_excerpt};
