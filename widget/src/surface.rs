//! Host-implemented UI surfaces.
//!
//! A surface is the only thing that touches real pixels. Controllers call
//! these methods in response to state transitions; hosts decide how to draw.
//! Methods take `&self` so a surface can be shared with the host's event
//! loop; implementations use interior mutability where they need it.

use crate::render::{MessageView, ResultView, TypingIndicatorView};

/// Drawing operations the chat widget needs.
pub trait ChatSurface: Send + Sync {
    /// Expand or collapse the panel.
    fn set_expanded(&self, expanded: bool);
    fn focus_input(&self);
    fn clear_input(&self);
    /// Enable or disable the input and send control.
    fn set_input_enabled(&self, enabled: bool);
    fn append_message(&self, view: &MessageView);
    fn show_typing(&self, view: &TypingIndicatorView);
    fn hide_typing(&self);
    /// Replace the suggestion chips.
    fn show_suggestions(&self, suggestions: &[String]);
}

/// Kind of a search-overlay notice, used by hosts to pick an icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Local prompt asking for a query.
    Prompt,
    NoResults,
    Error,
}

/// Drawing operations the search overlay needs.
pub trait SearchSurface: Send + Sync {
    fn set_visible(&self, visible: bool);
    fn focus_input(&self);
    fn show_loading(&self, text: &str);
    fn show_notice(&self, notice: Notice, text: &str);
    fn show_results(&self, results: &[ResultView]);
}
