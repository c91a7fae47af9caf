//! Message and typing-indicator view models.

use wire::Role;

use super::escape::{escape_html, split_lines};
use crate::state::Message;

#[cfg(test)]
#[path = "message_test.rs"]
mod message_test;

/// DOM id of the transient typing placeholder; hosts remove it by id.
pub const TYPING_INDICATOR_ID: &str = "typing-indicator";

const GREETING_ID: &str = "greeting";

/// Display fields for one chat bubble.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageView {
    pub id: String,
    pub role: Role,
    /// Plain-text lines, unescaped. Terminal hosts print these directly.
    pub lines: Vec<String>,
}

impl MessageView {
    /// CSS classes for the bubble (`message user` / `message bot`).
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match self.role {
            Role::User => "message user",
            Role::Assistant => "message bot",
        }
    }

    /// Escaped HTML for the bubble. Newlines become `<br>`; nothing else in
    /// the message text can produce markup.
    #[must_use]
    pub fn html(&self) -> String {
        let body = self
            .lines
            .iter()
            .map(|line| escape_html(line))
            .collect::<Vec<_>>()
            .join("<br>");
        format!(
            r#"<div class="{}" data-message-id="{}">{body}</div>"#,
            self.css_class(),
            escape_html(&self.id)
        )
    }

    /// The message text with lines rejoined by `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Project a conversation message to its display model.
#[must_use]
pub fn render_message(message: &Message) -> MessageView {
    MessageView { id: message.id.clone(), role: message.role, lines: split_lines(&message.content) }
}

/// Display-only assistant greeting. It is not part of the conversation.
#[must_use]
pub fn render_greeting(text: &str) -> MessageView {
    MessageView { id: GREETING_ID.to_owned(), role: Role::Assistant, lines: split_lines(text) }
}

/// The three-dot placeholder shown while awaiting a reply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypingIndicatorView;

impl TypingIndicatorView {
    #[must_use]
    pub fn html(self) -> String {
        format!(
            r#"<div class="message bot typing" id="{TYPING_INDICATOR_ID}"><div class="typing-indicator"><span></span><span></span><span></span></div></div>"#
        )
    }
}
